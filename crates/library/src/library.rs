use std::collections::HashMap;
use std::path::Path;

use prompt_core::{validate_elements, Prompt, PromptCategory};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{LibraryError, Result};

/// Categories listed first, in this order. Others follow by label.
pub const CATEGORY_PRIORITY: [&str; 5] = ["advising", "admin", "training", "marketing", "workshop"];

/// Category id for prompts that do not name one.
pub const DEFAULT_CATEGORY: &str = "other";

/// The prompt library: a JSON array of prompts.
#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    prompts: Vec<Prompt>,
}

impl PromptLibrary {
    pub fn new(prompts: Vec<Prompt>) -> Self {
        Self { prompts }
    }

    /// Read the library from disk. A missing or unreadable file gives an
    /// empty library.
    pub async fn read(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "Prompt library not found, using empty library");
            return Self::default();
        }

        match fs::read_to_string(path).await {
            Ok(content) => match Self::from_json(&content) {
                Ok(library) => {
                    debug!(path = %path.display(), prompts = library.len(), "Prompt library loaded");
                    library
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse prompt library, using empty library");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read prompt library, using empty library");
                Self::default()
            }
        }
    }

    /// Parse a library. Prompts whose structured body fails validation are
    /// skipped.
    pub fn from_json(content: &str) -> Result<Self> {
        let prompts: Vec<Prompt> = serde_json::from_str(content)?;

        let prompts = prompts
            .into_iter()
            .filter(|prompt| match validate_prompt(prompt) {
                Ok(()) => true,
                Err(e) => {
                    warn!(prompt_id = prompt.id, error = %e, "Skipping prompt with invalid body");
                    false
                }
            })
            .collect();

        Ok(Self { prompts })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.prompts)?)
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    pub fn find(&self, id: i64) -> Result<&Prompt> {
        self.get(id).ok_or(LibraryError::PromptNotFound(id))
    }

    /// Unique categories with prompt counts. The label comes from the first
    /// prompt seen in that category.
    pub fn categories(&self) -> Vec<PromptCategory> {
        let mut order: Vec<PromptCategory> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for prompt in &self.prompts {
            let id = category_id(prompt);
            match index.get(id) {
                Some(&i) => order[i].count += 1,
                None => {
                    index.insert(id, order.len());
                    let label = if prompt.category_label.trim().is_empty() {
                        title_case(id)
                    } else {
                        prompt.category_label.clone()
                    };
                    order.push(PromptCategory {
                        id: id.to_string(),
                        label,
                        count: 1,
                    });
                }
            }
        }

        order.sort_by(|a, b| {
            category_rank(&a.id)
                .cmp(&category_rank(&b.id))
                .then_with(|| a.label.cmp(&b.label))
        });
        order
    }

    pub fn by_category(&self, category: &str) -> Vec<&Prompt> {
        self.prompts
            .iter()
            .filter(|p| category_id(p) == category)
            .collect()
    }

    /// Case-insensitive search; every word of the query must occur in the
    /// title, description, category label or tags. A blank query matches
    /// everything.
    pub fn search(&self, query: &str) -> Vec<&Prompt> {
        let query = query.to_lowercase();
        let words: Vec<&str> = query.split_whitespace().collect();
        if words.is_empty() {
            return self.prompts.iter().collect();
        }

        self.prompts
            .iter()
            .filter(|prompt| {
                let haystack = searchable_text(prompt);
                words.iter().all(|word| haystack.contains(word))
            })
            .collect()
    }
}

/// Check that a structured body can key the session value stores.
pub fn validate_prompt(prompt: &Prompt) -> Result<()> {
    match &prompt.body {
        Some(body) => validate_elements(body).map_err(|source| LibraryError::InvalidPrompt {
            id: prompt.id,
            source,
        }),
        None => Ok(()),
    }
}

fn category_id(prompt: &Prompt) -> &str {
    if prompt.category.trim().is_empty() {
        DEFAULT_CATEGORY
    } else {
        &prompt.category
    }
}

fn category_rank(id: &str) -> usize {
    CATEGORY_PRIORITY
        .iter()
        .position(|c| *c == id)
        .unwrap_or(CATEGORY_PRIORITY.len())
}

fn searchable_text(prompt: &Prompt) -> String {
    [
        prompt.title.as_str(),
        prompt.description.as_str(),
        prompt.category_label.as_str(),
        prompt.tags.join(" ").as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

fn title_case(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut at_word_start = true;

    for c in id.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}
