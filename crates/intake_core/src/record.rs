use std::fmt;

/// Upload lifecycle of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    Uploading,
    Summarizing,
    Completed,
    Error,
}

impl FileStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, FileStatus::Completed | FileStatus::Error)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Uploading => write!(f, "uploading"),
            FileStatus::Summarizing => write!(f, "summarizing"),
            FileStatus::Completed => write!(f, "completed"),
            FileStatus::Error => write!(f, "error"),
        }
    }
}

/// A candidate file as seen at the admission boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// Canonical per-file status entry, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub size_label: String,
    pub status: FileStatus,
    pub progress: Option<u8>,
    pub error: Option<String>,
}

impl FileRecord {
    /// Fresh record for a newly admitted file.
    pub fn admitted(descriptor: &FileDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            size_label: format_file_size(descriptor.size),
            status: FileStatus::Uploading,
            progress: Some(0),
            error: None,
        }
    }

    pub fn uploading(&self, progress: u8) -> Self {
        self.with_status(FileStatus::Uploading, Some(progress.min(100)), None)
    }

    pub fn summarizing(&self, progress: u8) -> Self {
        self.with_status(FileStatus::Summarizing, Some(progress.min(100)), None)
    }

    pub fn completed(&self) -> Self {
        self.with_status(FileStatus::Completed, None, None)
    }

    pub fn failed(&self, message: impl Into<String>) -> Self {
        self.with_status(FileStatus::Error, None, Some(message.into()))
    }

    fn with_status(&self, status: FileStatus, progress: Option<u8>, error: Option<String>) -> Self {
        Self {
            name: self.name.clone(),
            size_label: self.size_label.clone(),
            status,
            progress,
            error,
        }
    }
}

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human readable size: base 1024, at most two decimals, trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    let rounded = (scaled * 100.0).round() / 100.0;
    let mut text = format!("{rounded:.2}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    format!("{text} {}", SIZE_UNITS[unit])
}
