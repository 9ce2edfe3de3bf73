use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Single-line fillable field rendered inline with the surrounding text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct TokenField {
    pub id: String,
    pub label: String,
    #[serde(rename = "ph", default)]
    pub placeholder: String,
    #[serde(rename = "tip", default)]
    pub tooltip: String,
}

/// Single-select choice field. Holds one fixed option or, when
/// `allow_custom` is set, one free-typed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct PillsField {
    pub id: String,
    pub label: String,
    #[serde(rename = "opts", default)]
    pub options: Vec<String>,
    #[serde(rename = "custom", default)]
    pub allow_custom: bool,
    #[serde(rename = "tip", default)]
    pub tooltip: String,
}

impl PillsField {
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|opt| opt == value)
    }
}

/// Multi-line fillable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct BlockField {
    pub id: String,
    pub label: String,
    #[serde(rename = "ph", default)]
    pub placeholder: String,
    #[serde(rename = "tip", default)]
    pub tooltip: String,
    #[serde(rename = "opt", default)]
    pub optional: bool,
}

/// File attachment slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct UploadField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub hint: String,
    /// Comma-separated list in the `accept` attribute format, e.g. `.pdf,.docx`
    #[serde(rename = "accept", default)]
    pub accepted_types: String,
}

impl UploadField {
    /// Check a file name against the accepted types.
    ///
    /// Extension entries (`.pdf`) are compared case-insensitively. An empty
    /// list, a wildcard, or a MIME entry accepts any name since MIME types
    /// cannot be checked from the name alone.
    pub fn accepts(&self, file_name: &str) -> bool {
        let entries: Vec<&str> = self
            .accepted_types
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect();

        if entries.is_empty() {
            return true;
        }

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| format!(".{}", ext.to_lowercase()));

        entries.iter().any(|entry| {
            if let Some(ext) = entry.strip_prefix('.') {
                extension.as_deref() == Some(format!(".{}", ext.to_lowercase()).as_str())
            } else {
                true
            }
        })
    }
}

/// Repeatable list field holding between one and `max` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MultiField {
    pub id: String,
    pub label: String,
    #[serde(rename = "ph", default)]
    pub placeholder: String,
    #[serde(rename = "tip", default)]
    pub tooltip: String,
    pub max: usize,
}

/// One unit of a structured template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum BodyElement {
    Text {
        #[serde(rename = "c")]
        content: String,
    },
    Label {
        #[serde(rename = "c")]
        content: String,
    },
    Token(TokenField),
    Pills(PillsField),
    Block(BlockField),
    Upload(UploadField),
    Or,
    Multi(MultiField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Text,
    Label,
    Token,
    Pills,
    Block,
    Upload,
    Or,
    Multi,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Label => "label",
            Self::Token => "token",
            Self::Pills => "pills",
            Self::Block => "block",
            Self::Upload => "upload",
            Self::Or => "or",
            Self::Multi => "multi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "label" => Some(Self::Label),
            "token" => Some(Self::Token),
            "pills" => Some(Self::Pills),
            "block" => Some(Self::Block),
            "upload" => Some(Self::Upload),
            "or" => Some(Self::Or),
            "multi" => Some(Self::Multi),
            _ => None,
        }
    }
}

impl BodyElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Text { .. } => ElementKind::Text,
            Self::Label { .. } => ElementKind::Label,
            Self::Token(_) => ElementKind::Token,
            Self::Pills(_) => ElementKind::Pills,
            Self::Block(_) => ElementKind::Block,
            Self::Upload(_) => ElementKind::Upload,
            Self::Or => ElementKind::Or,
            Self::Multi(_) => ElementKind::Multi,
        }
    }

    /// Id of a fillable element, `None` for static ones.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Token(f) => Some(&f.id),
            Self::Pills(f) => Some(&f.id),
            Self::Block(f) => Some(&f.id),
            Self::Upload(f) => Some(&f.id),
            Self::Multi(f) => Some(&f.id),
            Self::Text { .. } | Self::Label { .. } | Self::Or => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Token(f) => Some(&f.label),
            Self::Pills(f) => Some(&f.label),
            Self::Block(f) => Some(&f.label),
            Self::Upload(f) => Some(&f.label),
            Self::Multi(f) => Some(&f.label),
            Self::Label { content } => Some(content),
            Self::Text { .. } | Self::Or => None,
        }
    }

    pub fn is_fillable(&self) -> bool {
        self.id().is_some()
    }
}

/// Reject element sequences whose field ids cannot key the value stores.
pub fn validate_elements(elements: &[BodyElement]) -> Result<()> {
    let mut seen = HashSet::new();

    for element in elements {
        let Some(id) = element.id() else {
            continue;
        };

        if id.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "{} field has an empty id",
                element.kind().as_str()
            )));
        }

        if !seen.insert(id) {
            return Err(CoreError::DuplicateFieldId(id.to_string()));
        }

        if let BodyElement::Multi(field) = element {
            if field.max == 0 {
                return Err(CoreError::Validation(format!(
                    "multi field '{}' must allow at least one entry",
                    field.id
                )));
            }
        }
    }

    Ok(())
}
