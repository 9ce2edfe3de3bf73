use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Duplicate field id in template: {0}")]
    DuplicateFieldId(String),

    #[error("Prompt is incomplete: {filled} of {total} required fields filled")]
    Incomplete { filled: usize, total: usize },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
