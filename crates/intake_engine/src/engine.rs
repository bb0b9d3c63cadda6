use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use intake_logging::intake_info;
use tokio_util::sync::CancellationToken;

use crate::backend::{Backend, ChannelProgressSink};
use crate::coordinator::Coordinator;
use crate::orchestrator::UploadSettings;
use crate::{EngineEvent, FilePayload};

enum EngineCommand {
    Ingest { batch: Vec<FilePayload> },
    CancelAll,
}

/// Runs the coordinator on a background runtime and hands events back to a
/// synchronous caller. Events arrive on one channel, in emission order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(backend: Arc<dyn Backend>, settings: UploadSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let coordinator = Arc::new(Coordinator::new(backend, settings));

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut cancel = CancellationToken::new();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Ingest { batch } => {
                        let coordinator = coordinator.clone();
                        let event_tx = event_tx.clone();
                        let cancel = cancel.clone();
                        runtime.spawn(async move {
                            let sink = ChannelProgressSink::new(event_tx.clone());
                            let report = coordinator.ingest(&batch, &sink, &cancel).await;
                            let _ = event_tx.send(EngineEvent::BatchFinished(report));
                        });
                    }
                    EngineCommand::CancelAll => {
                        intake_info!("Cancelling in-flight uploads");
                        cancel.cancel();
                        cancel = CancellationToken::new();
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn ingest(&self, batch: Vec<FilePayload>) {
        let _ = self.cmd_tx.send(EngineCommand::Ingest { batch });
    }

    /// Abandons every batch started so far. Later batches are unaffected.
    pub fn cancel_all(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CancelAll);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}
