use crate::domain::{BodyElement, SessionState};

/// Tab/Enter navigation between the single-line tokens of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusNavigator {
    token_ids: Vec<String>,
}

impl FocusNavigator {
    pub fn new(elements: &[BodyElement]) -> Self {
        let token_ids = elements
            .iter()
            .filter_map(|element| match element {
                BodyElement::Token(field) => Some(field.id.clone()),
                _ => None,
            })
            .collect();

        Self { token_ids }
    }

    pub fn token_ids(&self) -> &[String] {
        &self.token_ids
    }

    /// Token after `current`, `None` when `current` is last or unknown.
    pub fn next_after(&self, current: &str) -> Option<&str> {
        let idx = self.token_ids.iter().position(|id| id == current)?;
        self.token_ids.get(idx + 1).map(String::as_str)
    }

    /// Move focus past `current`. Leaves the state untouched when there is
    /// nowhere to go.
    pub fn advance(&self, state: &mut SessionState, current: &str) -> Option<String> {
        let next = self.next_after(current)?.to_string();
        state.focused = Some(next.clone());
        Some(next)
    }
}
