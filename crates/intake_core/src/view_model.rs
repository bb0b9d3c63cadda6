use crate::{ChatMessage, FileStatus, Panel, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub panel: Panel,
    pub files: Vec<FileRowView>,
    pub selected: Vec<String>,
    pub active_session: Option<SessionId>,
    pub session_count: usize,
    pub active_files: Vec<String>,
    pub messages: Vec<ChatMessage>,
    pub query_pending: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub name: String,
    pub size_label: String,
    pub status: FileStatus,
    pub progress: Option<u8>,
    pub error: Option<String>,
    pub selected: bool,
    pub has_summary: bool,
}

impl FileRowView {
    /// Short status caption for list rows.
    pub fn caption(&self) -> &'static str {
        match self.status {
            FileStatus::Uploading => "Uploading...",
            FileStatus::Summarizing => "Summarizing...",
            FileStatus::Completed => "Ready",
            FileStatus::Error => "Error",
        }
    }
}
