use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use intake_core::{FileDescriptor, FileRecord};

/// A file selected for upload, with its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl FilePayload {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn descriptor(&self) -> FileDescriptor {
        FileDescriptor::new(self.name.clone(), self.bytes.len() as u64, self.mime_type.clone())
    }
}

/// Backend-issued authorization for one direct transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub target_url: String,
    pub form_fields: BTreeMap<String, String>,
    pub object_key_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferReceipt {
    pub object_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPayload {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Status delta for one file, ready for the record store merge.
    Record(FileRecord),
    /// Summarization output; always emitted before the `Completed` record.
    Summary { name: String, payload: SummaryPayload },
    /// Every accepted file of a batch reached a terminal status.
    BatchFinished(BatchReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub completed: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub rejected: Vec<String>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.rejected.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    InvalidRequest,
    HttpStatus(u16),
    Timeout,
    InvalidResponse,
    MissingObjectKey,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::MissingObjectKey => write!(f, "missing object key"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Why one file ended in `Error`. The display text is what the record carries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("credential-fetch-failed: {0}")]
    Credential(BackendError),
    #[error("transfer-failed: {0}")]
    Transfer(BackendError),
    #[error("notify-failed: {0}")]
    Notify(BackendError),
    #[error("summarize-failed: {0}")]
    Summary(BackendError),
    #[error("cancelled")]
    Cancelled,
}

impl UploadError {
    /// Stable identifier of the failed step.
    pub fn cause(&self) -> &'static str {
        match self {
            UploadError::Credential(_) => "credential-fetch-failed",
            UploadError::Transfer(_) => "transfer-failed",
            UploadError::Notify(_) => "notify-failed",
            UploadError::Summary(_) => "summarize-failed",
            UploadError::Cancelled => intake_core::CANCELLED_CAUSE,
        }
    }

    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            UploadError::Credential(err)
            | UploadError::Transfer(err)
            | UploadError::Notify(err)
            | UploadError::Summary(err) => Some(err),
            UploadError::Cancelled => None,
        }
    }
}
