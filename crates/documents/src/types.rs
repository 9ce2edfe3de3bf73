use std::path::Path;

use bytes::Bytes;
use prompt_core::FileRef;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{DocumentError, Result};

/// A file picked for an upload field.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                DocumentError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", path.display()),
                ))
            })?;
        let bytes = fs::read(path).await?;

        Ok(Self::new(name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Reference stored in the session once the upload succeeded.
    pub fn file_ref(&self) -> FileRef {
        let file = FileRef::new(&self.name, self.size());
        match &self.content_type {
            Some(content_type) => file.with_content_type(content_type),
            None => file,
        }
    }
}

/// Response of the ingestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub filename: String,
    #[serde(default)]
    pub chunks_created: u32,
    #[serde(default)]
    pub total_chunks: u32,
    #[serde(default)]
    pub ingestion_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plan.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let file = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "plan.pdf");
        assert_eq!(file.size(), 8);
        assert!(file.content_type.is_none());
    }

    #[tokio::test]
    async fn test_from_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let err = UploadFile::from_path(&temp_dir.path().join("nope.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Io(_)));
    }

    #[test]
    fn test_file_ref() {
        let file = UploadFile::new("notes.txt", "hello").with_content_type("text/plain");
        let file_ref = file.file_ref();
        assert_eq!(file_ref.name, "notes.txt");
        assert_eq!(file_ref.size, 5);
        assert_eq!(file_ref.content_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_upload_result_without_optional_fields() {
        let result: UploadResult = serde_json::from_str(r#"{"filename": "a.pdf"}"#).unwrap();
        assert_eq!(result.chunks_created, 0);
        assert!(result.ingestion_error.is_none());
    }
}
