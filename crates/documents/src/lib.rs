//! Document attachments for upload fields.
//!
//! Files are sent to the document ingestion service through a
//! [`DocumentUploader`]; [`UploadSlots`] keeps one upload in flight per
//! field and records per-field failures.

pub mod error;
pub mod http;
pub mod slots;
pub mod types;
pub mod uploader;

pub use error::{DocumentError, Result};
pub use http::HttpUploader;
pub use slots::{UploadGuard, UploadSlots, DEFAULT_UPLOAD_ERROR};
pub use types::{UploadFile, UploadResult};
pub use uploader::DocumentUploader;
