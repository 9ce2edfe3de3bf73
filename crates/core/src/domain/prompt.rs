use serde::{Deserialize, Serialize};

use super::element::BodyElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateMode {
    /// Free text with bracketed placeholders
    Legacy,
    /// Pre-authored body element sequence
    Structured,
}

/// An entry of the prompt library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub category_label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Legacy template text
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub is_workflow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<BodyElement>>,
}

impl Prompt {
    pub fn new(id: i64, title: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            category: String::new(),
            category_label: String::new(),
            description: String::new(),
            tags: Vec::new(),
            prompt: prompt.into(),
            is_workflow: false,
            workflow_id: None,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Vec<BodyElement>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_category(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.category = id.into();
        self.category_label = label.into();
        self
    }

    /// Prompts with a non-empty body compose in structured mode.
    pub fn mode(&self) -> TemplateMode {
        match &self.body {
            Some(body) if !body.is_empty() => TemplateMode::Structured,
            _ => TemplateMode::Legacy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct PromptCategory {
    pub id: String,
    pub label: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mode() {
        let prompt = Prompt::new(1, "Letter", "Dear [CLIENT NAME]");
        assert_eq!(prompt.mode(), TemplateMode::Legacy);

        let prompt = prompt.with_body(vec![]);
        assert_eq!(prompt.mode(), TemplateMode::Legacy);

        let prompt = prompt.with_body(vec![BodyElement::Text {
            content: "Hi".to_string(),
        }]);
        assert_eq!(prompt.mode(), TemplateMode::Structured);
    }

    #[test]
    fn test_prompt_wire_format() {
        let json = r#"{
            "id": 7,
            "title": "Loan memo",
            "category": "advising",
            "categoryLabel": "Advising",
            "description": "Draft a memo",
            "tags": ["loans"],
            "prompt": "Summarize [CLIENT NAME]",
            "isWorkflow": false
        }"#;

        let prompt: Prompt = serde_json::from_str(json).unwrap();
        assert_eq!(prompt.category_label, "Advising");
        assert!(prompt.body.is_none());

        let value = serde_json::to_value(&prompt).unwrap();
        assert_eq!(value["categoryLabel"], "Advising");
        assert!(value.get("body").is_none());
    }
}
