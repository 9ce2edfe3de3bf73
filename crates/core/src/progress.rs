use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{BodyElement, Placeholder, SessionState};

/// Required-field completion of a composition session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Progress {
    pub filled: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.filled == self.total
    }

    /// Completion in percent, 0 for templates without required fields.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.filled as f64 / self.total as f64 * 100.0
        }
    }

    fn count(&mut self, filled: bool) {
        self.total += 1;
        if filled {
            self.filled += 1;
        }
    }
}

/// Required slots of a structured template in element order, each with its
/// filled flag.
///
/// An upload directly followed by `or` and a block is satisfied by either the
/// file or text in that block.
pub fn required_slots<'a>(
    elements: &'a [BodyElement],
    state: &SessionState,
) -> Vec<(&'a BodyElement, bool)> {
    let mut slots = Vec::new();

    for (i, element) in elements.iter().enumerate() {
        let filled = match element {
            BodyElement::Token(field) => state.filled_value(&field.id).is_some(),
            BodyElement::Pills(field) => state.filled_value(&field.id).is_some(),
            BodyElement::Block(field) => {
                if field.optional {
                    continue;
                }
                state.filled_value(&field.id).is_some()
            }
            BodyElement::Upload(field) => {
                state.has_file(&field.id) || paired_block_filled(elements, i, state)
            }
            BodyElement::Multi(field) => !state.filled_rows(&field.id).is_empty(),
            BodyElement::Text { .. } | BodyElement::Label { .. } | BodyElement::Or => continue,
        };
        slots.push((element, filled));
    }

    slots
}

pub fn body_progress(elements: &[BodyElement], state: &SessionState) -> Progress {
    let mut progress = Progress::default();
    for (_, filled) in required_slots(elements, state) {
        progress.count(filled);
    }
    progress
}

fn paired_block_filled(elements: &[BodyElement], upload_index: usize, state: &SessionState) -> bool {
    match (elements.get(upload_index + 1), elements.get(upload_index + 2)) {
        (Some(BodyElement::Or), Some(BodyElement::Block(block))) => {
            state.filled_value(&block.id).is_some()
        }
        _ => false,
    }
}

/// One slot per placeholder, filled when its key has a non-blank value.
pub fn legacy_progress(placeholders: &[Placeholder], values: &HashMap<String, String>) -> Progress {
    let mut progress = Progress::default();

    for placeholder in placeholders {
        let filled = values
            .get(&placeholder.key)
            .is_some_and(|v| !v.trim().is_empty());
        progress.count(filled);
    }

    progress
}
