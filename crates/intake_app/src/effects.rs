use std::collections::HashMap;
use std::time::Duration;

use intake_core::{Effect, Msg};
use intake_engine::{BatchReport, EngineEvent, EngineHandle, FilePayload};
use intake_logging::{intake_error, intake_info, intake_warn};

/// What the event loop receives from the engine side.
#[derive(Debug)]
pub enum Inbox {
    Msg(Msg),
    BatchFinished(BatchReport),
}

/// Executes reducer effects against the engine and translates engine events
/// back into reducer messages.
pub struct EffectRunner {
    engine: EngineHandle,
    staged: HashMap<String, FilePayload>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            staged: HashMap::new(),
        }
    }

    /// Keeps loaded file contents until a `StartIngest` names them.
    pub fn stage(&mut self, payload: FilePayload) {
        self.staged.insert(payload.name.clone(), payload);
    }

    /// Runs the effects and returns how many batches were handed to the engine.
    pub fn enqueue(&mut self, effects: Vec<Effect>) -> usize {
        let mut started = 0;
        for effect in effects {
            match effect {
                Effect::StartIngest { files } => {
                    let batch: Vec<FilePayload> = files
                        .iter()
                        .filter_map(|file| {
                            let payload = self.staged.remove(&file.name);
                            if payload.is_none() {
                                intake_error!("No staged contents for {}", file.name);
                            }
                            payload
                        })
                        .collect();
                    if batch.is_empty() {
                        continue;
                    }
                    intake_info!("StartIngest files={}", batch.len());
                    self.engine.ingest(batch);
                    started += 1;
                }
                Effect::CancelUploads => {
                    self.engine.cancel_all();
                }
                Effect::SubmitQuery {
                    session_id,
                    query,
                    files,
                } => {
                    intake_warn!(
                        "No query service configured; dropping query for session {} ({} chars, {} files)",
                        session_id,
                        query.len(),
                        files.len()
                    );
                }
            }
        }
        started
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next(&self, timeout: Duration) -> Option<Inbox> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Inbox {
    match event {
        EngineEvent::Record(record) => Inbox::Msg(Msg::RecordsUpdated(vec![record])),
        EngineEvent::Summary { name, payload } => Inbox::Msg(Msg::SummaryReady {
            name,
            summary: payload.summary,
        }),
        EngineEvent::BatchFinished(report) => Inbox::BatchFinished(report),
    }
}
