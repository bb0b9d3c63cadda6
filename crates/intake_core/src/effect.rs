use crate::{FileDescriptor, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand a batch to the concurrency coordinator.
    StartIngest { files: Vec<FileDescriptor> },
    /// Abandon every in-flight upload.
    CancelUploads,
    /// Forward a query, with its file context, to the query service.
    SubmitQuery {
        session_id: SessionId,
        query: String,
        files: Vec<String>,
    },
}
