//! Intake engine: the remote upload protocol and its concurrent execution.
mod backend;
mod coordinator;
mod engine;
mod http;
mod orchestrator;
mod payload;
mod types;

pub use backend::{Backend, ChannelProgressSink, ProgressSink, TransferProgress};
pub use coordinator::Coordinator;
pub use engine::EngineHandle;
pub use http::{BackendSettings, ReqwestBackend};
pub use orchestrator::{UploadOrchestrator, UploadSettings};
pub use payload::load_payload;
pub use types::{
    BackendError, BatchReport, Credential, EngineEvent, FailureKind, FilePayload, SummaryPayload,
    TransferReceipt, UploadError,
};
