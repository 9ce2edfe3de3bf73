//! Per-field upload bookkeeping.
//!
//! Each upload field has at most one upload in flight. A failure is recorded
//! as a short message for that field only and never touches other values of
//! the session.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use prompt_core::{BodyElement, Composer};
use tracing::{debug, info, warn};

use crate::error::{DocumentError, Result};
use crate::types::{UploadFile, UploadResult};
use crate::uploader::DocumentUploader;

/// Message shown when an upload failed without a usable description.
pub const DEFAULT_UPLOAD_ERROR: &str = "Upload failed";

#[derive(Debug, Default)]
struct SlotTable {
    pending: HashSet<String>,
    errors: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct UploadSlots {
    table: Arc<Mutex<SlotTable>>,
}

impl UploadSlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, SlotTable> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mark `slot` as uploading. Fails if an upload for it is already running.
    pub fn begin(&self, slot: &str) -> Result<UploadGuard> {
        let mut table = self.table();
        if !table.pending.insert(slot.to_string()) {
            return Err(DocumentError::UploadInProgress(slot.to_string()));
        }
        table.errors.remove(slot);

        debug!(slot = %slot, "Upload started");
        Ok(UploadGuard {
            table: Arc::clone(&self.table),
            slot: slot.to_string(),
        })
    }

    pub fn is_uploading(&self, slot: &str) -> bool {
        self.table().pending.contains(slot)
    }

    /// Last failure recorded for `slot`.
    pub fn error(&self, slot: &str) -> Option<String> {
        self.table().errors.get(slot).cloned()
    }

    pub fn clear_error(&self, slot: &str) {
        self.table().errors.remove(slot);
    }

    fn record_error(&self, slot: &str, error: &DocumentError) {
        let message = error.to_string();
        let message = if message.trim().is_empty() {
            DEFAULT_UPLOAD_ERROR.to_string()
        } else {
            message
        };
        self.table().errors.insert(slot.to_string(), message);
    }

    /// Upload `file` for the upload field `slot` and, on success, attach it
    /// to the session. On failure the session is left unchanged and the
    /// error is recorded for the slot.
    ///
    /// Clones of `UploadSlots` share one table, so a slot already uploading
    /// from another task fails with `UploadInProgress`.
    pub async fn attach<U>(
        &self,
        uploader: &U,
        composer: &mut Composer,
        slot: &str,
        file: UploadFile,
    ) -> Result<UploadResult>
    where
        U: DocumentUploader + ?Sized,
    {
        let accepted = match composer.template().field(slot) {
            Some(BodyElement::Upload(field)) => {
                if field.accepts(&file.name) {
                    None
                } else {
                    Some(field.accepted_types.clone())
                }
            }
            _ => return Err(DocumentError::UnknownSlot(slot.to_string())),
        };

        if let Some(accepted) = accepted {
            let err = DocumentError::NotAccepted {
                file_name: file.name.clone(),
                accepted,
            };
            self.record_error(slot, &err);
            return Err(err);
        }

        let _guard = self.begin(slot)?;

        match uploader.upload(&file).await {
            Ok(result) => {
                if let Some(ingestion_error) = &result.ingestion_error {
                    warn!(slot = %slot, file = %file.name, error = %ingestion_error, "Document stored but ingestion reported an error");
                }
                composer.attach_file(slot, file.file_ref());
                info!(slot = %slot, file = %file.name, chunks = result.chunks_created, "Document attached");
                Ok(result)
            }
            Err(e) => {
                warn!(slot = %slot, file = %file.name, error = %e, "Document upload failed");
                self.record_error(slot, &e);
                Err(e)
            }
        }
    }
}

/// Held while an upload runs; clears the pending mark when dropped.
pub struct UploadGuard {
    table: Arc<Mutex<SlotTable>>,
    slot: String,
}

impl UploadGuard {
    pub fn slot(&self) -> &str {
        &self.slot
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        let mut table = self
            .table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        table.pending.remove(&self.slot);
        debug!(slot = %self.slot, "Upload finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use prompt_core::{BlockField, Prompt, UploadField};

    struct FakeUploader {
        fail_with: Option<String>,
    }

    #[async_trait]
    impl DocumentUploader for FakeUploader {
        async fn upload(&self, file: &UploadFile) -> Result<UploadResult> {
            match &self.fail_with {
                Some(message) => Err(DocumentError::Rejected {
                    message: message.clone(),
                    status: 500,
                }),
                None => Ok(UploadResult {
                    filename: file.name.clone(),
                    chunks_created: 2,
                    total_chunks: 2,
                    ingestion_error: None,
                }),
            }
        }
    }

    fn composer() -> Composer {
        let prompt = Prompt::new(1, "Plan review", "").with_body(vec![
            BodyElement::Upload(UploadField {
                id: "plan".to_string(),
                label: "Business plan".to_string(),
                hint: String::new(),
                accepted_types: ".pdf,.docx".to_string(),
            }),
            BodyElement::Block(BlockField {
                id: "notes".to_string(),
                label: "Notes".to_string(),
                placeholder: String::new(),
                tooltip: String::new(),
                optional: false,
            }),
        ]);
        Composer::open(&prompt)
    }

    #[test]
    fn test_begin_rejects_second_upload_for_same_slot() {
        let slots = UploadSlots::new();
        let guard = slots.begin("plan").unwrap();
        assert_eq!(guard.slot(), "plan");
        assert!(slots.is_uploading("plan"));

        assert!(matches!(
            slots.begin("plan"),
            Err(DocumentError::UploadInProgress(_))
        ));
        assert!(slots.begin("other").is_ok());

        drop(guard);
        assert!(!slots.is_uploading("plan"));
        assert!(slots.begin("plan").is_ok());
    }

    #[tokio::test]
    async fn test_attach_waits_for_slot_held_by_clone() {
        let slots = UploadSlots::new();
        let other = slots.clone();
        let guard = other.begin("plan").unwrap();

        let mut composer = composer();
        let err = slots
            .attach(
                &FakeUploader { fail_with: None },
                &mut composer,
                "plan",
                UploadFile::new("plan.pdf", b"data".to_vec()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentError::UploadInProgress(_)));
        assert!(!composer.state().has_file("plan"));
        assert!(slots.error("plan").is_none());

        drop(guard);
        assert!(!slots.is_uploading("plan"));
    }

    #[tokio::test]
    async fn test_attach_success_fills_slot() {
        let slots = UploadSlots::new();
        let mut composer = composer();
        composer.set_value("notes", "keep me");

        let result = slots
            .attach(
                &FakeUploader { fail_with: None },
                &mut composer,
                "plan",
                UploadFile::new("plan.PDF", b"data".to_vec()),
            )
            .await
            .unwrap();

        assert_eq!(result.chunks_created, 2);
        assert!(composer.state().has_file("plan"));
        assert_eq!(composer.progress().filled, 2);
        assert!(!slots.is_uploading("plan"));
        assert!(slots.error("plan").is_none());
    }

    #[tokio::test]
    async fn test_attach_failure_is_scoped_to_slot() {
        let slots = UploadSlots::new();
        let mut composer = composer();
        composer.set_value("notes", "keep me");

        let uploader = FakeUploader {
            fail_with: Some("Unsupported file type".to_string()),
        };
        let err = slots
            .attach(&uploader, &mut composer, "plan", UploadFile::new("plan.pdf", b"x".to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentError::Rejected { .. }));
        assert_eq!(slots.error("plan").as_deref(), Some("Unsupported file type"));
        assert!(!composer.state().has_file("plan"));
        assert_eq!(composer.value("notes"), Some("keep me"));
        assert!(!slots.is_uploading("plan"));
    }

    #[tokio::test]
    async fn test_blank_failure_message_falls_back() {
        let slots = UploadSlots::new();
        let mut composer = composer();
        let uploader = FakeUploader {
            fail_with: Some(String::new()),
        };

        let _ = slots
            .attach(&uploader, &mut composer, "plan", UploadFile::new("plan.pdf", b"x".to_vec()))
            .await;
        assert_eq!(slots.error("plan").as_deref(), Some(DEFAULT_UPLOAD_ERROR));
    }

    #[tokio::test]
    async fn test_attach_checks_accepted_types() {
        let slots = UploadSlots::new();
        let mut composer = composer();

        let err = slots
            .attach(
                &FakeUploader { fail_with: None },
                &mut composer,
                "plan",
                UploadFile::new("photo.png", b"x".to_vec()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentError::NotAccepted { .. }));
        assert!(slots.error("plan").is_some());
        assert!(!composer.state().has_file("plan"));
    }

    #[tokio::test]
    async fn test_attach_unknown_slot() {
        let slots = UploadSlots::new();
        let mut composer = composer();

        let err = slots
            .attach(
                &FakeUploader { fail_with: None },
                &mut composer,
                "notes",
                UploadFile::new("plan.pdf", b"x".to_vec()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::UnknownSlot(_)));
    }

    #[tokio::test]
    async fn test_new_attempt_clears_previous_error() {
        let slots = UploadSlots::new();
        let mut composer = composer();

        let failing = FakeUploader {
            fail_with: Some("Server busy".to_string()),
        };
        let _ = slots
            .attach(&failing, &mut composer, "plan", UploadFile::new("plan.pdf", b"x".to_vec()))
            .await;
        assert!(slots.error("plan").is_some());

        slots
            .attach(
                &FakeUploader { fail_with: None },
                &mut composer,
                "plan",
                UploadFile::new("plan.pdf", b"x".to_vec()),
            )
            .await
            .unwrap();
        assert!(slots.error("plan").is_none());
    }
}
