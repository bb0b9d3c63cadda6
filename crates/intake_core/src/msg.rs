use crate::{FileDescriptor, FileRecord, Panel, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked files for upload (drop or file dialog).
    FilesSelected(Vec<FileDescriptor>),
    /// Status deltas from the engine, in arrival order.
    RecordsUpdated(Vec<FileRecord>),
    /// Summarization result for a completed file.
    SummaryReady { name: String, summary: String },
    /// User clicked a file row in the chat sidebar.
    SelectionToggled(String),
    /// User started a new chat.
    NewChatClicked,
    /// User switched to an existing chat.
    SessionActivated(SessionId),
    /// User submitted a query in the active chat.
    QuerySubmitted(String),
    /// Answer from the external query service.
    AnswerReceived {
        session_id: SessionId,
        content: String,
    },
    /// User navigated between the upload and chat surfaces.
    PanelChanged(Panel),
    /// The consumer is going away; in-flight uploads must be abandoned.
    Teardown,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
