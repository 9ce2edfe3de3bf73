use serde::{Deserialize, Serialize};

use crate::domain::PillsField;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PillState {
    #[default]
    Unselected,
    /// One of the fixed options
    Option { value: String },
    /// A free-typed value
    Custom { value: String },
    /// The custom input is open; `previous` is restored on cancel
    EditingCustom {
        draft: String,
        previous: Box<PillState>,
    },
}

impl PillState {
    /// Rebuild the state a stored value corresponds to. A value outside the
    /// options is only kept when the field allows custom values.
    pub fn from_value(field: &PillsField, value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.is_empty() => Self::Unselected,
            Some(v) if field.has_option(v) => Self::Option {
                value: v.to_string(),
            },
            Some(v) if field.allow_custom => Self::Custom {
                value: v.to_string(),
            },
            _ => Self::Unselected,
        }
    }

    /// Whether `value` may be stored for `field`. Blank clears the field.
    pub fn accepts(field: &PillsField, value: &str) -> bool {
        let value = value.trim();
        value.is_empty() || field.has_option(value) || field.allow_custom
    }

    /// The active value. While editing, the value committed before editing.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Unselected => None,
            Self::Option { value } | Self::Custom { value } => Some(value),
            Self::EditingCustom { previous, .. } => previous.value(),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::EditingCustom { .. })
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }

    /// State with any open editor closed.
    fn settled(self) -> Self {
        match self {
            Self::EditingCustom { previous, .. } => *previous,
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum PillEvent {
    /// A fixed option was clicked
    Click(String),
    /// "+ Other" was clicked
    OpenCustom,
    /// The custom input text changed
    Type(String),
    /// Enter or blur in the custom input
    Commit,
    /// Escape in the custom input
    Cancel,
}

pub struct PillStateMachine;

impl PillStateMachine {
    pub fn apply(field: &PillsField, state: PillState, event: PillEvent) -> PillState {
        match event {
            PillEvent::Click(option) => {
                if !field.has_option(&option) {
                    return state;
                }
                let current = state.settled();
                if current.value() == Some(option.as_str()) {
                    PillState::Unselected
                } else {
                    PillState::Option { value: option }
                }
            }
            PillEvent::OpenCustom => {
                if !field.allow_custom || state.is_editing() {
                    return state;
                }
                let draft = match &state {
                    PillState::Custom { value } => value.clone(),
                    _ => String::new(),
                };
                PillState::EditingCustom {
                    draft,
                    previous: Box::new(state),
                }
            }
            PillEvent::Type(text) => match state {
                PillState::EditingCustom { previous, .. } => PillState::EditingCustom {
                    draft: text,
                    previous,
                },
                other => other,
            },
            PillEvent::Commit => match state {
                PillState::EditingCustom { draft, .. } => {
                    PillState::from_value(field, Some(&draft))
                }
                other => other,
            },
            PillEvent::Cancel => state.settled(),
        }
    }

    pub fn can_open_custom(field: &PillsField, state: &PillState) -> bool {
        field.allow_custom && !state.is_editing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(allow_custom: bool) -> PillsField {
        PillsField {
            id: "type".to_string(),
            label: "Loan type".to_string(),
            options: vec!["loan".to_string(), "grant".to_string()],
            allow_custom,
            tooltip: String::new(),
        }
    }

    fn option(value: &str) -> PillState {
        PillState::Option {
            value: value.to_string(),
        }
    }

    #[test]
    fn test_click_selects_and_toggles_off() {
        let field = field(false);
        let state = PillStateMachine::apply(&field, PillState::Unselected, PillEvent::Click("loan".into()));
        assert_eq!(state, option("loan"));
        assert_eq!(state.value(), Some("loan"));

        let state = PillStateMachine::apply(&field, state, PillEvent::Click("grant".into()));
        assert_eq!(state, option("grant"));

        let state = PillStateMachine::apply(&field, state, PillEvent::Click("grant".into()));
        assert_eq!(state, PillState::Unselected);
    }

    #[test]
    fn test_click_unknown_option_is_ignored() {
        let field = field(false);
        let state = PillStateMachine::apply(&field, option("loan"), PillEvent::Click("bond".into()));
        assert_eq!(state, option("loan"));
    }

    #[test]
    fn test_custom_requires_allow_custom() {
        let field = field(false);
        let state = PillStateMachine::apply(&field, PillState::Unselected, PillEvent::OpenCustom);
        assert_eq!(state, PillState::Unselected);
        assert!(!PillStateMachine::can_open_custom(&field, &state));
    }

    #[test]
    fn test_custom_commit() {
        let field = field(true);
        let state = PillStateMachine::apply(&field, option("loan"), PillEvent::OpenCustom);
        assert!(state.is_editing());
        assert_eq!(state.value(), Some("loan"));

        let state = PillStateMachine::apply(&field, state, PillEvent::Type("  Microloan ".into()));
        let state = PillStateMachine::apply(&field, state, PillEvent::Commit);
        assert_eq!(
            state,
            PillState::Custom {
                value: "Microloan".to_string()
            }
        );
        assert!(state.is_custom());
    }

    #[test]
    fn test_custom_commit_empty_unselects() {
        let field = field(true);
        let state = PillStateMachine::apply(&field, option("grant"), PillEvent::OpenCustom);
        let state = PillStateMachine::apply(&field, state, PillEvent::Type("   ".into()));
        let state = PillStateMachine::apply(&field, state, PillEvent::Commit);
        assert_eq!(state, PillState::Unselected);
    }

    #[test]
    fn test_custom_commit_matching_option_selects_option() {
        let field = field(true);
        let state = PillStateMachine::apply(&field, PillState::Unselected, PillEvent::OpenCustom);
        let state = PillStateMachine::apply(&field, state, PillEvent::Type("grant".into()));
        let state = PillStateMachine::apply(&field, state, PillEvent::Commit);
        assert_eq!(state, option("grant"));
    }

    #[test]
    fn test_open_custom_prefills_active_custom_value() {
        let field = field(true);
        let custom = PillState::Custom {
            value: "Equity".to_string(),
        };
        let state = PillStateMachine::apply(&field, custom, PillEvent::OpenCustom);
        match &state {
            PillState::EditingCustom { draft, .. } => assert_eq!(draft, "Equity"),
            other => panic!("expected editing state, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_restores_previous() {
        let field = field(true);
        let state = PillStateMachine::apply(&field, option("loan"), PillEvent::OpenCustom);
        let state = PillStateMachine::apply(&field, state, PillEvent::Type("Other".into()));
        let state = PillStateMachine::apply(&field, state, PillEvent::Cancel);
        assert_eq!(state, option("loan"));
    }

    #[test]
    fn test_click_while_editing_closes_editor() {
        let field = field(true);
        let state = PillStateMachine::apply(&field, option("loan"), PillEvent::OpenCustom);
        let state = PillStateMachine::apply(&field, state, PillEvent::Click("loan".into()));
        assert_eq!(state, PillState::Unselected);

        let state = PillStateMachine::apply(&field, PillState::Unselected, PillEvent::OpenCustom);
        let state = PillStateMachine::apply(&field, state, PillEvent::Click("grant".into()));
        assert_eq!(state, option("grant"));
    }

    #[test]
    fn test_from_value() {
        let field = field(true);
        assert_eq!(PillState::from_value(&field, None), PillState::Unselected);
        assert_eq!(PillState::from_value(&field, Some("loan")), option("loan"));
        assert!(PillState::from_value(&field, Some("Bonds")).is_custom());
    }

    #[test]
    fn test_from_value_without_custom_drops_free_text() {
        let fixed = field(false);
        assert_eq!(PillState::from_value(&fixed, Some("Bonds")), PillState::Unselected);
        assert_eq!(PillState::from_value(&fixed, Some(" grant ")), option("grant"));

        assert!(!PillState::accepts(&fixed, "Bonds"));
        assert!(PillState::accepts(&fixed, "loan"));
        assert!(PillState::accepts(&fixed, "  "));
        assert!(PillState::accepts(&field(true), "Bonds"));
    }
}
