use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Prompt not found: {0}")]
    PromptNotFound(i64),

    #[error("Invalid prompt {id}: {source}")]
    InvalidPrompt {
        id: i64,
        #[source]
        source: prompt_core::CoreError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
