//! Composition session: one open template plus the values entered so far
//!
//! The session owns the value stores and routes edit events to the pure
//! engine functions. It ends with [`Composer::send`] or [`Composer::cancel`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::compiler::{compile_body, compile_legacy};
use crate::domain::{BodyElement, FileRef, Placeholder, Prompt, SessionState, TemplateMode};
use crate::error::{CoreError, Result};
use crate::extractor::extract_placeholders;
use crate::focus::FocusNavigator;
use crate::multi;
use crate::pills::{PillEvent, PillState, PillStateMachine};
use crate::progress::{body_progress, legacy_progress, required_slots, Progress};

/// The immutable template a session composes.
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    Legacy {
        text: String,
        placeholders: Vec<Placeholder>,
    },
    Structured {
        elements: Vec<BodyElement>,
    },
}

impl Template {
    pub fn from_prompt(prompt: &Prompt) -> Self {
        match (&prompt.body, prompt.mode()) {
            (Some(body), TemplateMode::Structured) => Self::Structured {
                elements: body.clone(),
            },
            _ => Self::legacy(&prompt.prompt),
        }
    }

    pub fn legacy(text: &str) -> Self {
        Self::Legacy {
            text: text.to_string(),
            placeholders: extract_placeholders(text),
        }
    }

    pub fn structured(elements: Vec<BodyElement>) -> Self {
        Self::Structured { elements }
    }

    pub fn mode(&self) -> TemplateMode {
        match self {
            Self::Legacy { .. } => TemplateMode::Legacy,
            Self::Structured { .. } => TemplateMode::Structured,
        }
    }

    pub fn placeholders(&self) -> &[Placeholder] {
        match self {
            Self::Legacy { placeholders, .. } => placeholders,
            Self::Structured { .. } => &[],
        }
    }

    pub fn elements(&self) -> &[BodyElement] {
        match self {
            Self::Legacy { .. } => &[],
            Self::Structured { elements } => elements,
        }
    }

    /// Structured field with the given id.
    pub fn field(&self, id: &str) -> Option<&BodyElement> {
        self.elements().iter().find(|el| el.id() == Some(id))
    }

    fn has_placeholder(&self, key: &str) -> bool {
        self.placeholders().iter().any(|ph| ph.key == key)
    }
}

pub struct Composer {
    id: Uuid,
    prompt_id: Option<i64>,
    template: Template,
    state: SessionState,
    pills: HashMap<String, PillState>,
    navigator: FocusNavigator,
    opened_at: DateTime<Utc>,
}

impl Composer {
    pub fn new(template: Template) -> Self {
        let navigator = FocusNavigator::new(template.elements());
        Self {
            id: Uuid::new_v4(),
            prompt_id: None,
            template,
            state: SessionState::new(),
            pills: HashMap::new(),
            navigator,
            opened_at: Utc::now(),
        }
    }

    pub fn open(prompt: &Prompt) -> Self {
        let mut composer = Self::new(Template::from_prompt(prompt));
        composer.prompt_id = Some(prompt.id);
        composer
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn prompt_id(&self) -> Option<i64> {
        self.prompt_id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn mode(&self) -> TemplateMode {
        self.template.mode()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Form fields of a legacy template, one per placeholder key.
    pub fn fields(&self) -> &[Placeholder] {
        self.template.placeholders()
    }

    pub fn navigator(&self) -> &FocusNavigator {
        &self.navigator
    }

    /// Set a token, block or pills value (structured) or a placeholder value
    /// (legacy). Returns `false` when no such field exists, or when a pills
    /// field without custom values is given text outside its options.
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let pill_state = match self.template.mode() {
            TemplateMode::Legacy => {
                if !self.template.has_placeholder(id) {
                    return false;
                }
                None
            }
            TemplateMode::Structured => match self.template.field(id) {
                Some(BodyElement::Token(_)) | Some(BodyElement::Block(_)) => None,
                Some(BodyElement::Pills(field)) => {
                    if !PillState::accepts(field, &value) {
                        return false;
                    }
                    Some(PillState::from_value(field, Some(&value)))
                }
                _ => return false,
            },
        };

        match pill_state {
            Some(state) => self.store_pill(id, state),
            None => {
                self.state.values.insert(id.to_string(), value);
            }
        }
        true
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.state.values.get(id).map(String::as_str)
    }

    /// Feed a pill selector event to the pills field `id`.
    pub fn pill_event(&mut self, id: &str, event: PillEvent) -> bool {
        let Some(BodyElement::Pills(field)) = self.template.field(id) else {
            return false;
        };

        let current = self.pills.remove(id).unwrap_or_else(|| {
            PillState::from_value(field, self.state.values.get(id).map(String::as_str))
        });
        let next = PillStateMachine::apply(field, current, event);
        self.store_pill(id, next);
        true
    }

    pub fn pill_state(&self, id: &str) -> PillState {
        match (self.pills.get(id), self.template.field(id)) {
            (Some(state), _) => state.clone(),
            (None, Some(BodyElement::Pills(field))) => {
                PillState::from_value(field, self.value(id))
            }
            _ => PillState::Unselected,
        }
    }

    fn store_pill(&mut self, id: &str, state: PillState) {
        match state.value() {
            Some(value) => {
                self.state
                    .values
                    .insert(id.to_string(), value.to_string());
            }
            None => {
                self.state.values.remove(id);
            }
        }
        self.pills.insert(id.to_string(), state);
    }

    pub fn attach_file(&mut self, id: &str, file: FileRef) -> bool {
        if !matches!(self.template.field(id), Some(BodyElement::Upload(_))) {
            return false;
        }
        self.state.files.insert(id.to_string(), file);
        true
    }

    pub fn detach_file(&mut self, id: &str) -> bool {
        self.state.files.remove(id).is_some()
    }

    /// Rows of a multi field, never empty.
    pub fn rows(&self, id: &str) -> Vec<String> {
        let mut rows = self
            .state
            .multi_values
            .get(id)
            .cloned()
            .unwrap_or_default();
        multi::normalize_rows(&mut rows);
        rows
    }

    pub fn add_row(&mut self, id: &str) -> bool {
        let Some(BodyElement::Multi(field)) = self.template.field(id) else {
            return false;
        };
        let rows = self.state.multi_values.entry(id.to_string()).or_default();
        multi::add_row(rows, field.max)
    }

    pub fn remove_row(&mut self, id: &str, index: usize) -> bool {
        if !matches!(self.template.field(id), Some(BodyElement::Multi(_))) {
            return false;
        }
        let rows = self.state.multi_values.entry(id.to_string()).or_default();
        multi::remove_row(rows, index)
    }

    pub fn set_row(&mut self, id: &str, index: usize, value: impl Into<String>) -> bool {
        if !matches!(self.template.field(id), Some(BodyElement::Multi(_))) {
            return false;
        }
        let rows = self.state.multi_values.entry(id.to_string()).or_default();
        multi::set_row(rows, index, value)
    }

    /// Put token `id` into edit mode.
    pub fn focus(&mut self, id: &str) -> bool {
        if !self.navigator.token_ids().iter().any(|t| t == id) {
            return false;
        }
        self.state.focused = Some(id.to_string());
        true
    }

    pub fn blur(&mut self) {
        self.state.focused = None;
    }

    pub fn focused(&self) -> Option<&str> {
        self.state.focused.as_deref()
    }

    /// Tab or Enter on token `id`: end its edit and move to the next token.
    pub fn commit_token(&mut self, id: &str) -> Option<String> {
        if self.state.focused.as_deref() == Some(id) {
            self.state.focused = None;
        }
        self.navigator.advance(&mut self.state, id)
    }

    pub fn progress(&self) -> Progress {
        match &self.template {
            Template::Legacy { placeholders, .. } => legacy_progress(placeholders, &self.state.values),
            Template::Structured { elements } => body_progress(elements, &self.state),
        }
    }

    /// Labels of required fields that are still empty, in template order.
    pub fn missing_fields(&self) -> Vec<String> {
        match &self.template {
            Template::Legacy { placeholders, .. } => placeholders
                .iter()
                .filter(|ph| self.state.filled_value(&ph.key).is_none())
                .map(|ph| ph.label.clone())
                .collect(),
            Template::Structured { elements } => required_slots(elements, &self.state)
                .into_iter()
                .filter(|(_, filled)| !filled)
                .filter_map(|(element, _)| element.label().map(str::to_string))
                .collect(),
        }
    }

    pub fn compile(&self) -> String {
        match &self.template {
            Template::Legacy { text, .. } => compile_legacy(text, &self.state.values),
            Template::Structured { elements } => compile_body(elements, &self.state),
        }
    }

    /// Structured prompts can be sent once every required field is filled;
    /// legacy prompts can always be sent.
    pub fn can_send(&self) -> bool {
        match self.mode() {
            TemplateMode::Legacy => true,
            TemplateMode::Structured => self.progress().is_complete(),
        }
    }

    /// End the session, handing back the compiled prompt.
    pub fn send(self) -> Result<String> {
        if !self.can_send() {
            let Progress { filled, total } = self.progress();
            return Err(CoreError::Incomplete { filled, total });
        }
        Ok(self.compile())
    }

    /// End the session, discarding everything entered.
    pub fn cancel(mut self) {
        self.state.clear();
        self.pills.clear();
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("id", &self.id)
            .field("prompt_id", &self.prompt_id)
            .field("mode", &self.mode())
            .field("progress", &self.progress())
            .finish()
    }
}
