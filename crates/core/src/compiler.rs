//! Template compilation: template + current values -> prompt text
//!
//! Unfilled fields stay visible in the output. Legacy placeholders keep their
//! original bracketed text; structured fields render as `[label]`.

use std::collections::HashMap;

use regex::Captures;
use serde::{Deserialize, Serialize};

use crate::domain::{BodyElement, SessionState};
use crate::extractor::{parse_placeholder, placeholder_regex};

pub const MULTI_SEPARATOR: &str = ", ";

/// Text inserted for a file attached to an upload slot.
pub fn attachment_marker(file_name: &str) -> String {
    format!("[Attached: {} — indexed for reference]", file_name)
}

fn unfilled_marker(label: &str) -> String {
    format!("[{}]", label)
}

/// Substitute every legacy placeholder whose key has a non-blank value.
///
/// Values are inserted verbatim; `$` and other replacement syntax carry no
/// meaning here.
pub fn compile_legacy(text: &str, values: &HashMap<String, String>) -> String {
    placeholder_regex()
        .replace_all(text, |caps: &Captures| {
            let key = parse_placeholder(&caps[1]).key;
            match values.get(&key).map(|v| v.trim()) {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// A run of legacy template text, split for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreviewSegment {
    Text { text: String },
    Filled { key: String, value: String },
    Unfilled { key: String, label: String },
}

pub fn preview_legacy(text: &str, values: &HashMap<String, String>) -> Vec<PreviewSegment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in placeholder_regex().captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };

        if whole.start() > cursor {
            segments.push(PreviewSegment::Text {
                text: text[cursor..whole.start()].to_string(),
            });
        }

        let placeholder = parse_placeholder(&caps[1]);
        let value = values
            .get(&placeholder.key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty());

        segments.push(match value {
            Some(value) => PreviewSegment::Filled {
                key: placeholder.key,
                value: value.to_string(),
            },
            None => PreviewSegment::Unfilled {
                key: placeholder.key,
                label: placeholder.label,
            },
        });

        cursor = whole.end();
    }

    if cursor < text.len() {
        segments.push(PreviewSegment::Text {
            text: text[cursor..].to_string(),
        });
    }

    segments
}

/// Render a structured template in element order.
pub fn compile_body(elements: &[BodyElement], state: &SessionState) -> String {
    let mut out = String::new();

    for element in elements {
        match element {
            BodyElement::Text { content } => out.push_str(content),
            BodyElement::Token(field) => match state.filled_value(&field.id) {
                Some(value) => out.push_str(value),
                None => out.push_str(&unfilled_marker(&field.label)),
            },
            BodyElement::Pills(field) => match state.filled_value(&field.id) {
                Some(value) => out.push_str(value),
                None => out.push_str(&unfilled_marker(&field.label)),
            },
            BodyElement::Block(field) => match state.filled_value(&field.id) {
                Some(value) => out.push_str(value),
                None => out.push_str(&unfilled_marker(&field.label)),
            },
            BodyElement::Upload(field) => {
                if let Some(file) = state.files.get(&field.id) {
                    out.push_str(&attachment_marker(&file.name));
                }
            }
            BodyElement::Multi(field) => {
                let rows = state.filled_rows(&field.id);
                if rows.is_empty() {
                    out.push_str(&unfilled_marker(&field.label));
                } else {
                    out.push_str(&rows.join(MULTI_SEPARATOR));
                }
            }
            BodyElement::Label { .. } | BodyElement::Or => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FileRef, MultiField, PillsField, TokenField, UploadField};

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn text(content: &str) -> BodyElement {
        BodyElement::Text {
            content: content.to_string(),
        }
    }

    #[test]
    fn test_compile_legacy_replaces_all_occurrences() {
        let template = "Hi [CLIENT NAME]. Bye [CLIENT NAME].";
        let compiled = compile_legacy(template, &values(&[("CLIENT_NAME", " Maria ")]));
        assert_eq!(compiled, "Hi Maria. Bye Maria.");
    }

    #[test]
    fn test_compile_legacy_keeps_unfilled() {
        let template = "Hi [CLIENT NAME] from [CITY].";
        let compiled = compile_legacy(template, &values(&[("CLIENT_NAME", "Maria"), ("CITY", "  ")]));
        assert_eq!(compiled, "Hi Maria from [CITY].");
    }

    #[test]
    fn test_compile_legacy_inserts_values_literally() {
        let template = "Budget: [AMOUNT]";
        let compiled = compile_legacy(template, &values(&[("AMOUNT", "$1 (or $2.*)")]));
        assert_eq!(compiled, "Budget: $1 (or $2.*)");
    }

    #[test]
    fn test_compile_legacy_without_placeholders() {
        let template = "Plain text with [lowercase brackets].";
        assert_eq!(compile_legacy(template, &HashMap::new()), template);
    }

    #[test]
    fn test_preview_segments() {
        let template = "Dear [CLIENT NAME], re: [TOPIC]!";
        let segments = preview_legacy(template, &values(&[("CLIENT_NAME", "Maria")]));

        assert_eq!(
            segments,
            vec![
                PreviewSegment::Text {
                    text: "Dear ".to_string()
                },
                PreviewSegment::Filled {
                    key: "CLIENT_NAME".to_string(),
                    value: "Maria".to_string()
                },
                PreviewSegment::Text {
                    text: ", re: ".to_string()
                },
                PreviewSegment::Unfilled {
                    key: "TOPIC".to_string(),
                    label: "Topic".to_string()
                },
                PreviewSegment::Text {
                    text: "!".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_compile_body_mixed_elements() {
        let elements = vec![
            BodyElement::Label {
                content: "Context".to_string(),
            },
            text("Client: "),
            BodyElement::Token(TokenField {
                id: "client".to_string(),
                label: "Client".to_string(),
                placeholder: String::new(),
                tooltip: String::new(),
            }),
            text("\nTone: "),
            BodyElement::Pills(PillsField {
                id: "tone".to_string(),
                label: "Tone".to_string(),
                options: vec!["warm".to_string()],
                allow_custom: false,
                tooltip: String::new(),
            }),
            text("\n"),
            BodyElement::Upload(UploadField {
                id: "doc".to_string(),
                label: "Plan".to_string(),
                hint: String::new(),
                accepted_types: String::new(),
            }),
            BodyElement::Or,
            text("Goals: "),
            BodyElement::Multi(MultiField {
                id: "goals".to_string(),
                label: "Goals".to_string(),
                placeholder: String::new(),
                tooltip: String::new(),
                max: 3,
            }),
        ];

        let empty = compile_body(&elements, &SessionState::new());
        assert_eq!(empty, "Client: [Client]\nTone: [Tone]\nGoals: [Goals]");

        let state = SessionState::new()
            .with_value("client", "Maria ")
            .with_value("tone", "warm")
            .with_file("doc", FileRef::new("plan.pdf", 10))
            .with_multi(
                "goals",
                vec!["grow".to_string(), "".to_string(), " hire ".to_string()],
            );
        let filled = compile_body(&elements, &state);
        assert_eq!(
            filled,
            "Client: Maria\nTone: warm\n[Attached: plan.pdf — indexed for reference]Goals: grow, hire"
        );
    }
}
