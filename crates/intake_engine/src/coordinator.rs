use std::sync::Arc;

use futures_util::future::join_all;
use intake_core::{validate, MAX_FILES};
use intake_logging::{intake_info, intake_warn};
use tokio_util::sync::CancellationToken;

use crate::backend::{Backend, ProgressSink};
use crate::orchestrator::{UploadOrchestrator, UploadSettings};
use crate::{BatchReport, EngineEvent, FilePayload};

/// Validates a batch and runs its accepted files concurrently.
pub struct Coordinator {
    backend: Arc<dyn Backend>,
    settings: UploadSettings,
}

impl Coordinator {
    pub fn new(backend: Arc<dyn Backend>, settings: UploadSettings) -> Self {
        Self { backend, settings }
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// Ingests one batch. Rejected files are reported as `Error` records
    /// straight away; accepted files each get their own orchestrator, all
    /// polled concurrently on the calling task. Returns once every accepted
    /// file is terminal.
    pub async fn ingest(
        &self,
        batch: &[FilePayload],
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let descriptors: Vec<_> = batch.iter().map(FilePayload::descriptor).collect();
        let validation = validate(&descriptors);
        for rejection in &validation.rejections {
            intake_warn!("Rejected: {}", rejection);
        }

        let mut report = BatchReport::default();
        for record in validation.rejected_records(&descriptors) {
            report.rejected.push(record.name.clone());
            sink.emit(EngineEvent::Record(record));
        }

        let accepted: Vec<&FilePayload> = batch
            .iter()
            .zip(&validation.verdicts)
            .filter(|(_, verdict)| verdict.is_accepted())
            .map(|(payload, _)| payload)
            .take(MAX_FILES)
            .collect();
        intake_info!(
            "Ingesting {} of {} files ({} rejected)",
            accepted.len(),
            batch.len(),
            report.rejected.len()
        );

        let orchestrator = UploadOrchestrator::new(self.backend.as_ref(), &self.settings, cancel);
        let runs = accepted.iter().map(|payload| {
            let orchestrator = &orchestrator;
            async move { (payload.name.clone(), orchestrator.run(payload, sink).await) }
        });

        for (name, result) in join_all(runs).await {
            match result {
                Ok(_) => report.completed.push(name),
                Err(err) => report.failed.push((name, err.to_string())),
            }
        }
        report
    }
}
