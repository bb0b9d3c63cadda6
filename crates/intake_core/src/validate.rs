use std::path::Path;

use crate::{FileDescriptor, FileRecord};

/// Upper bound on files per batch, and on simultaneous uploads per batch.
pub const MAX_FILES: usize = 5;

/// Extensions offered at the admission boundary. Informational only:
/// admission is decided by MIME type.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[
    "txt", "md", "pdf", "json", "csv", "log", "xml", "yaml", "yml",
];

const FALLBACK_MIME: &str = "application/octet-stream";

/// Admission outcome for one candidate, in candidate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(String),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    pub accepted: Vec<FileDescriptor>,
    pub rejections: Vec<String>,
    /// One entry per candidate; `verdicts[i]` decides `candidates[i]`.
    pub verdicts: Vec<Verdict>,
}

impl Validation {
    /// Immediate `Error` records for every candidate that was not accepted,
    /// each carrying its own verdict message. A count rejection gives every
    /// candidate the batch message.
    pub fn rejected_records(&self, candidates: &[FileDescriptor]) -> Vec<FileRecord> {
        candidates
            .iter()
            .zip(&self.verdicts)
            .filter_map(|(candidate, verdict)| match verdict {
                Verdict::Accepted => None,
                Verdict::Rejected(message) => {
                    Some(FileRecord::admitted(candidate).failed(message.clone()))
                }
            })
            .collect()
    }
}

/// Checks a candidate selection against the count, type and unique-name
/// constraints. Of several admissible candidates sharing a name, only the
/// first is accepted.
pub fn validate(candidates: &[FileDescriptor]) -> Validation {
    if candidates.len() > MAX_FILES {
        return Validation {
            accepted: Vec::new(),
            rejections: vec![count_message()],
            verdicts: vec![Verdict::Rejected(count_message()); candidates.len()],
        };
    }

    let mut validation = Validation::default();
    for candidate in candidates {
        let verdict = if !is_admissible_mime(&candidate.mime_type) {
            Verdict::Rejected(type_message(&candidate.name))
        } else if validation.accepted.iter().any(|a| a.name == candidate.name) {
            Verdict::Rejected(duplicate_message(&candidate.name))
        } else {
            Verdict::Accepted
        };
        match &verdict {
            Verdict::Accepted => validation.accepted.push(candidate.clone()),
            Verdict::Rejected(message) => validation.rejections.push(message.clone()),
        }
        validation.verdicts.push(verdict);
    }
    validation
}

pub fn is_admissible_mime(mime_type: &str) -> bool {
    mime_type.starts_with("text/") || mime_type == "application/pdf"
}

/// MIME type guessed from a path's extension, for files picked from disk.
pub fn mime_for_path(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return FALLBACK_MIME;
    };
    match ext.to_ascii_lowercase().as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "text/json",
        "xml" => "text/xml",
        "yaml" | "yml" => "text/yaml",
        "pdf" => "application/pdf",
        _ => FALLBACK_MIME,
    }
}

fn count_message() -> String {
    format!("Maximum {MAX_FILES} files allowed.")
}

fn type_message(name: &str) -> String {
    format!("{name} is not a text or PDF file")
}

fn duplicate_message(name: &str) -> String {
    format!("{name} appears more than once in this batch")
}
