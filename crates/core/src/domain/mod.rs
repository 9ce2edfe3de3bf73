pub mod element;
pub mod placeholder;
pub mod prompt;
pub mod session;

pub use element::{
    validate_elements, BlockField, BodyElement, ElementKind, MultiField, PillsField, TokenField,
    UploadField,
};
pub use placeholder::{classify_key, is_long_field, FieldKind, Placeholder, LONG_FIELD_KEYWORDS};
pub use prompt::{Prompt, PromptCategory, TemplateMode};
pub use session::{FileRef, SessionState};
