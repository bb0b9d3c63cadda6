use crate::{BackendError, Credential, EngineEvent, FilePayload, SummaryPayload, TransferReceipt};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Receives byte acknowledgements while a transfer is in flight.
pub trait TransferProgress: Send + Sync {
    fn acked(&self, acked: u64, total: u64);
}

/// The remote side of the upload protocol.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_upload_credential(&self, file_name: &str) -> Result<Credential, BackendError>;

    async fn transfer(
        &self,
        credential: &Credential,
        payload: &FilePayload,
        progress: &dyn TransferProgress,
    ) -> Result<TransferReceipt, BackendError>;

    /// Resolves the object key for a transferred file.
    async fn notify(&self, file_name: &str) -> Result<String, BackendError>;

    async fn trigger_summary(&self, object_key: &str) -> Result<SummaryPayload, BackendError>;
}
