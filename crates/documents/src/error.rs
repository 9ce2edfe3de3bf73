use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("An upload is already in progress for '{0}'")]
    UploadInProgress(String),

    #[error("No upload field '{0}' in this template")]
    UnknownSlot(String),

    #[error("{file_name} is not an accepted file type ({accepted})")]
    NotAccepted { file_name: String, accepted: String },

    /// The ingestion service answered with a non-success status
    #[error("{message}")]
    Rejected { message: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DocumentError>;
