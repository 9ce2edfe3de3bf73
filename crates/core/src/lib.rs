//! Prompt template engine.
//!
//! Turns a prompt template into final prompt text. Two template shapes are
//! supported: legacy free text with `[BRACKETED PLACEHOLDERS]`, and a
//! structured sequence of typed body elements. Both go through the same
//! pipeline: parse, model, track progress, compile.

pub mod compiler;
pub mod composer;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod focus;
pub mod multi;
pub mod pills;
pub mod progress;

pub use compiler::{
    attachment_marker, compile_body, compile_legacy, preview_legacy, PreviewSegment,
    MULTI_SEPARATOR,
};
pub use composer::{Composer, Template};
pub use domain::*;
pub use error::{CoreError, Result};
pub use extractor::{extract_placeholders, normalize_key, parse_placeholder};
pub use focus::FocusNavigator;
pub use pills::{PillEvent, PillState, PillStateMachine};
pub use progress::{body_progress, legacy_progress, required_slots, Progress};
