use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{DocumentError, Result};
use crate::types::{UploadFile, UploadResult};
use crate::uploader::DocumentUploader;

const UPLOAD_PATH: &str = "/api/documents/upload";

/// Uploader for the HTTP ingestion endpoint.
#[derive(Clone)]
pub struct HttpUploader {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpUploader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, UPLOAD_PATH)
    }
}

#[async_trait]
impl DocumentUploader for HttpUploader {
    async fn upload(&self, file: &UploadFile) -> Result<UploadResult> {
        debug!(file = %file.name, size = file.size(), "Uploading document");

        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new().part("file", part);

        let mut request = self.client.post(self.upload_url()).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = rejection_message(&error_text, status.as_u16());
            error!(file = %file.name, status = status.as_u16(), error = %message, "Document upload rejected");
            return Err(DocumentError::Rejected {
                message,
                status: status.as_u16(),
            });
        }

        let result: UploadResult = response.json().await?;
        debug!(
            file = %result.filename,
            chunks_created = result.chunks_created,
            total_chunks = result.total_chunks,
            "Document uploaded"
        );

        Ok(result)
    }
}

/// The `detail` field of a JSON error body, or a generic message with the
/// status code.
fn rejection_message(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|detail| !detail.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Upload failed ({})", status))
}
