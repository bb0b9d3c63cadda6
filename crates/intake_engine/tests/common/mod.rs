#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use intake_core::{FileRecord, FileStatus};
use intake_engine::{
    Backend, BackendError, Credential, EngineEvent, FailureKind, FilePayload, ProgressSink,
    SummaryPayload, TransferProgress, TransferReceipt,
};
use tokio::sync::Barrier;

#[derive(Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Record deltas for one file, in emission order.
pub fn records_for(events: &[EngineEvent], name: &str) -> Vec<FileRecord> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Record(record) if record.name == name => Some(record.clone()),
            _ => None,
        })
        .collect()
}

pub fn steps(records: &[FileRecord]) -> Vec<(FileStatus, Option<u8>)> {
    records.iter().map(|r| (r.status, r.progress)).collect()
}

pub fn text_payload(name: &str, len: usize) -> FilePayload {
    FilePayload::new(name, "text/plain", vec![b'x'; len])
}

/// In-memory backend whose failures and pacing are chosen per file name.
#[derive(Default)]
pub struct ScriptedBackend {
    fail_credential: HashSet<String>,
    fail_transfer: HashSet<String>,
    fail_notify: HashSet<String>,
    fail_summary: HashSet<String>,
    receipt_keys: bool,
    transfer_delay: Duration,
    transfer_barrier: Option<Arc<Barrier>>,
    calls: Mutex<Vec<String>>,
    transferred: Mutex<Vec<(String, String)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            receipt_keys: true,
            ..Self::default()
        }
    }

    pub fn fail_credential(mut self, name: &str) -> Self {
        self.fail_credential.insert(name.to_string());
        self
    }

    pub fn fail_transfer(mut self, name: &str) -> Self {
        self.fail_transfer.insert(name.to_string());
        self
    }

    pub fn fail_notify(mut self, name: &str) -> Self {
        self.fail_notify.insert(name.to_string());
        self
    }

    pub fn fail_summary(mut self, name: &str) -> Self {
        self.fail_summary.insert(name.to_string());
        self
    }

    pub fn without_receipt_keys(mut self) -> Self {
        self.receipt_keys = false;
        self
    }

    pub fn transfer_delay(mut self, delay: Duration) -> Self {
        self.transfer_delay = delay;
        self
    }

    /// Every transfer waits until `parties` transfers are in flight.
    pub fn transfer_barrier(mut self, parties: usize) -> Self {
        self.transfer_barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// `(name, mime_type)` of every payload handed to `transfer`.
    pub fn transferred(&self) -> Vec<(String, String)> {
        self.transferred.lock().unwrap().clone()
    }

    fn record_call(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn key_for(name: &str) -> String {
    format!("uploads/{name}")
}

fn server_error(what: &str) -> BackendError {
    BackendError::new(FailureKind::HttpStatus(500), format!("{what} refused"))
}

#[async_trait::async_trait]
impl Backend for ScriptedBackend {
    async fn fetch_upload_credential(&self, file_name: &str) -> Result<Credential, BackendError> {
        self.record_call(format!("credential:{file_name}"));
        if self.fail_credential.contains(file_name) {
            return Err(server_error("credential"));
        }
        Ok(Credential {
            target_url: "http://objects.invalid/upload".to_string(),
            form_fields: Default::default(),
            object_key_hint: None,
        })
    }

    async fn transfer(
        &self,
        _credential: &Credential,
        payload: &FilePayload,
        progress: &dyn TransferProgress,
    ) -> Result<TransferReceipt, BackendError> {
        self.record_call(format!("transfer:{}", payload.name));
        self.transferred
            .lock()
            .unwrap()
            .push((payload.name.clone(), payload.mime_type.clone()));
        let total = payload.bytes.len() as u64;
        progress.acked(0, total);
        progress.acked(total / 2, total);
        if let Some(barrier) = &self.transfer_barrier {
            barrier.wait().await;
        }
        if !self.transfer_delay.is_zero() {
            tokio::time::sleep(self.transfer_delay).await;
        }
        if self.fail_transfer.contains(&payload.name) {
            return Err(BackendError::new(FailureKind::Network, "connection reset"));
        }
        progress.acked(total, total);
        Ok(TransferReceipt {
            object_key: self.receipt_keys.then(|| key_for(&payload.name)),
        })
    }

    async fn notify(&self, file_name: &str) -> Result<String, BackendError> {
        self.record_call(format!("notify:{file_name}"));
        if self.fail_notify.contains(file_name) {
            return Err(server_error("notify"));
        }
        Ok(key_for(file_name))
    }

    async fn trigger_summary(&self, object_key: &str) -> Result<SummaryPayload, BackendError> {
        self.record_call(format!("summary:{object_key}"));
        let name = object_key.trim_start_matches("uploads/");
        if self.fail_summary.contains(name) {
            return Err(server_error("summary"));
        }
        Ok(SummaryPayload {
            summary: format!("summary of {name}"),
        })
    }
}
