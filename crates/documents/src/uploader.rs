use async_trait::async_trait;

use crate::error::Result;
use crate::types::{UploadFile, UploadResult};

/// Sends a file to the document ingestion service.
#[async_trait]
pub trait DocumentUploader: Send + Sync {
    async fn upload(&self, file: &UploadFile) -> Result<UploadResult>;
}
