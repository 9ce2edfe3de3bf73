use serde::{Deserialize, Serialize};

/// Key fragments that mark a legacy placeholder as free-form content.
pub const LONG_FIELD_KEYWORDS: [&str; 8] = [
    "PASTE", "DESCRIBE", "LIST", "SUMMARY", "NOTES", "CONTENT", "DETAILS", "OVERVIEW",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line input
    Short,
    /// Multi-line input
    Long,
}

/// A bracketed placeholder found in legacy template text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Placeholder {
    /// Exact bracketed text as it appears in the template
    pub raw: String,
    /// Normalized key into the value map
    pub key: String,
    pub label: String,
    /// Example text from a `" - "` clause, empty when absent
    pub hint: String,
}

impl Placeholder {
    pub fn field_kind(&self) -> FieldKind {
        classify_key(&self.key)
    }

    /// Text shown inside the empty input.
    pub fn input_placeholder(&self) -> String {
        if self.hint.is_empty() {
            format!("Enter {}", self.label.to_lowercase())
        } else {
            self.hint.clone()
        }
    }
}

pub fn is_long_field(key: &str) -> bool {
    LONG_FIELD_KEYWORDS.iter().any(|kw| key.contains(kw))
}

pub fn classify_key(key: &str) -> FieldKind {
    if is_long_field(key) {
        FieldKind::Long
    } else {
        FieldKind::Short
    }
}
