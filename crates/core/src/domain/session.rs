use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reference to a file attached to an upload slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct FileRef {
    pub name: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileRef {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Value stores of one composition session, keyed by field id (structured
/// mode) or placeholder key (legacy mode).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SessionState {
    /// token, pills and block values
    #[serde(default)]
    pub values: HashMap<String, String>,
    #[serde(default)]
    pub files: HashMap<String, FileRef>,
    #[serde(default)]
    pub multi_values: HashMap<String, Vec<String>>,
    /// Token currently in edit mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(id.into(), value.into());
        self
    }

    pub fn with_file(mut self, id: impl Into<String>, file: FileRef) -> Self {
        self.files.insert(id.into(), file);
        self
    }

    pub fn with_multi(mut self, id: impl Into<String>, rows: Vec<String>) -> Self {
        self.multi_values.insert(id.into(), rows);
        self
    }

    /// Trimmed value, `None` when missing or blank.
    pub fn filled_value(&self, id: &str) -> Option<&str> {
        self.values
            .get(id)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn has_file(&self, id: &str) -> bool {
        self.files.contains_key(id)
    }

    /// Non-blank entries of a multi field, trimmed.
    pub fn filled_rows(&self, id: &str) -> Vec<&str> {
        self.multi_values
            .get(id)
            .map(|rows| {
                rows.iter()
                    .map(|row| row.trim())
                    .filter(|row| !row.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.files.clear();
        self.multi_values.clear();
        self.focused = None;
    }
}
