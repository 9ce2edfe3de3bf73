//! Placeholder extraction for legacy (free text) templates
//!
//! A placeholder is a bracketed run starting with an uppercase letter, e.g.
//! `[CLIENT NAME]`, optionally carrying an example after a `" - "` separator:
//! `[LOAN TYPE - e.g., "SBA 7(a)"]`. Bracket text that does not fit this shape
//! is ordinary text.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::Placeholder;

const HINT_SEPARATOR: &str = " - ";
const EXAMPLE_MARKERS: [&str; 3] = ["e.g.,", "e.g.", "eg."];

/// Compiled placeholder pattern. Group 1 is the text between the brackets.
pub(crate) fn placeholder_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"\[([A-Z][A-Z0-9 /&,.'"_\-—]+(?:\s*-\s*[^\]\n]+)?)\]"#)
            .expect("Invalid placeholder regex pattern")
    })
}

/// Extract placeholders in order of first appearance, one per key.
pub fn extract_placeholders(text: &str) -> Vec<Placeholder> {
    let mut seen = HashSet::new();
    let mut placeholders = Vec::new();

    for caps in placeholder_regex().captures_iter(text) {
        let Some(inner) = caps.get(1) else {
            continue;
        };

        let placeholder = parse_placeholder(inner.as_str());
        if seen.insert(placeholder.key.clone()) {
            placeholders.push(placeholder);
        }
    }

    placeholders
}

/// Build a placeholder from the text between the brackets.
pub fn parse_placeholder(inner: &str) -> Placeholder {
    let (name, hint) = match inner.split_once(HINT_SEPARATOR) {
        Some((name, hint)) => (name.trim(), clean_hint(hint)),
        None => (inner.trim(), String::new()),
    };

    Placeholder {
        raw: format!("[{}]", inner),
        key: normalize_key(name),
        label: derive_label(name),
        hint,
    }
}

/// Uppercase, collapse every non-alphanumeric run into `_`, trim underscores.
pub fn normalize_key(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars().flat_map(char::to_uppercase) {
        if c.is_ascii_uppercase() || c.is_ascii_digit() {
            if pending_separator && !key.is_empty() {
                key.push('_');
            }
            pending_separator = false;
            key.push(c);
        } else {
            pending_separator = true;
        }
    }

    key
}

fn derive_label(name: &str) -> String {
    if name == name.to_uppercase() {
        title_case(name)
    } else {
        name.to_string()
    }
}

/// Keep the first word character of each whitespace-separated word and
/// lowercase the rest of the word.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_whitespace() {
            in_word = false;
            out.push(c);
        } else if in_word {
            out.extend(c.to_lowercase());
        } else {
            if c.is_alphanumeric() || c == '_' {
                in_word = true;
            }
            out.push(c);
        }
    }

    out
}

fn clean_hint(hint: &str) -> String {
    let mut hint = hint.trim();

    for marker in EXAMPLE_MARKERS {
        let matches_marker = hint
            .get(..marker.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(marker));
        if matches_marker {
            hint = hint[marker.len()..].trim_start();
            break;
        }
    }

    let quotes: &[char] = &['"', '\''];
    let hint = hint.strip_prefix(quotes).unwrap_or(hint);
    let hint = hint.strip_suffix(quotes).unwrap_or(hint);
    hint.trim().to_string()
}
