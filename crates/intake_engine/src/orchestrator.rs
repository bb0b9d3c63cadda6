use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use intake_core::FileRecord;
use intake_logging::{intake_debug, intake_info, intake_warn};
use tokio_util::sync::CancellationToken;

use crate::backend::{Backend, ProgressSink, TransferProgress};
use crate::{
    BackendError, EngineEvent, FailureKind, FilePayload, SummaryPayload, UploadError,
};

#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Ask the backend for the object key after the transfer instead of
    /// taking it from the transfer receipt or credential.
    pub notify_stage: bool,
    /// Upper bound for each remote step.
    pub step_timeout: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            notify_stage: true,
            step_timeout: Duration::from_secs(60),
        }
    }
}

/// Drives one file through credential fetch, transfer, optional notify and
/// summarization. Never touches shared state; every change is emitted as a
/// record delta.
pub struct UploadOrchestrator<'a> {
    backend: &'a dyn Backend,
    settings: &'a UploadSettings,
    cancel: &'a CancellationToken,
}

impl<'a> UploadOrchestrator<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        settings: &'a UploadSettings,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            backend,
            settings,
            cancel,
        }
    }

    pub async fn run(
        &self,
        payload: &FilePayload,
        sink: &dyn ProgressSink,
    ) -> Result<SummaryPayload, UploadError> {
        let record = FileRecord::admitted(&payload.descriptor());
        sink.emit(EngineEvent::Record(record.clone()));

        let result = self.drive(&record, payload, sink).await;
        match &result {
            Ok(summary) => {
                intake_info!("{} completed", payload.name);
                sink.emit(EngineEvent::Summary {
                    name: payload.name.clone(),
                    payload: summary.clone(),
                });
                sink.emit(EngineEvent::Record(record.completed()));
            }
            Err(err) => {
                intake_warn!("{} failed: {}", payload.name, err);
                sink.emit(EngineEvent::Record(record.failed(err.to_string())));
            }
        }
        result
    }

    async fn drive(
        &self,
        record: &FileRecord,
        payload: &FilePayload,
        sink: &dyn ProgressSink,
    ) -> Result<SummaryPayload, UploadError> {
        let credential = self
            .step(
                self.backend.fetch_upload_credential(&payload.name),
                UploadError::Credential,
            )
            .await?;
        intake_debug!("{} credential for {}", payload.name, credential.target_url);

        let progress = RecordProgress::new(record, sink);
        let receipt = self
            .step(
                self.backend.transfer(&credential, payload, &progress),
                UploadError::Transfer,
            )
            .await?;
        sink.emit(EngineEvent::Record(record.summarizing(100)));
        intake_debug!("{} transferred {} bytes", payload.name, payload.bytes.len());

        let object_key = if self.settings.notify_stage {
            self.step(self.backend.notify(&payload.name), UploadError::Notify)
                .await?
        } else {
            receipt
                .object_key
                .or(credential.object_key_hint)
                .ok_or_else(|| {
                    UploadError::Summary(BackendError::new(
                        FailureKind::MissingObjectKey,
                        "neither transfer nor credential named an object key",
                    ))
                })?
        };
        intake_debug!("{} stored as {}", payload.name, object_key);

        self.step(
            self.backend.trigger_summary(&object_key),
            UploadError::Summary,
        )
        .await
    }

    /// Runs one remote step under the step timeout; cancellation wins over
    /// any in-flight work.
    async fn step<T, F>(
        &self,
        future: F,
        wrap: fn(BackendError) -> UploadError,
    ) -> Result<T, UploadError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        let timeout = self.settings.step_timeout;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(UploadError::Cancelled),
            outcome = tokio::time::timeout(timeout, future) => match outcome {
                Ok(result) => result.map_err(wrap),
                Err(_) => Err(wrap(BackendError::new(
                    FailureKind::Timeout,
                    format!("no response within {timeout:?}"),
                ))),
            },
        }
    }
}

/// Turns byte acknowledgements into `Uploading` deltas, clamped below 100
/// until the transfer returns. Repeated percentages are dropped, and so is
/// the final full ack: the `Summarizing(100)` delta reports it.
struct RecordProgress<'a> {
    record: &'a FileRecord,
    sink: &'a dyn ProgressSink,
    last: Mutex<Option<u8>>,
}

impl<'a> RecordProgress<'a> {
    fn new(record: &'a FileRecord, sink: &'a dyn ProgressSink) -> Self {
        Self {
            record,
            sink,
            last: Mutex::new(record.progress),
        }
    }
}

impl TransferProgress for RecordProgress<'_> {
    fn acked(&self, acked: u64, total: u64) {
        if total > 0 && acked >= total {
            return;
        }
        let percent = transfer_percent(acked, total);
        let Ok(mut last) = self.last.lock() else {
            return;
        };
        if *last == Some(percent) {
            return;
        }
        *last = Some(percent);
        self.sink
            .emit(EngineEvent::Record(self.record.uploading(percent)));
    }
}

pub(crate) fn transfer_percent(acked: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = acked.min(total) as f64 / total as f64;
    ((ratio * 100.0).round() as u8).min(99)
}

#[cfg(test)]
mod tests {
    use super::transfer_percent;

    #[test]
    fn percent_is_clamped_below_completion() {
        assert_eq!(transfer_percent(0, 200), 0);
        assert_eq!(transfer_percent(100, 200), 50);
        assert_eq!(transfer_percent(199, 200), 99);
        assert_eq!(transfer_percent(200, 200), 99);
        assert_eq!(transfer_percent(500, 200), 99);
        assert_eq!(transfer_percent(5, 0), 0);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(transfer_percent(1, 3), 33);
        assert_eq!(transfer_percent(2, 3), 67);
    }
}
