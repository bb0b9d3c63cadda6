use std::collections::HashMap;

use intake_core::{AppViewModel, FileRowView, FileStatus, Panel};

/// Turns view models into terminal lines, printing a row only when it changed
/// since the previous render.
#[derive(Debug, Default)]
pub struct Renderer {
    shown: HashMap<String, FileRowView>,
    panel: Panel,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();
        for row in &view.files {
            if self.shown.get(&row.name) == Some(row) {
                continue;
            }
            lines.push(row_line(row));
            self.shown.insert(row.name.clone(), row.clone());
        }

        if view.panel != self.panel {
            self.panel = view.panel;
            if view.panel == Panel::Chat {
                lines.push(format!(
                    "Session {} ready with {} file(s)",
                    view.active_session.unwrap_or_default(),
                    view.active_files.len()
                ));
            }
        }
        lines
    }
}

fn row_line(row: &FileRowView) -> String {
    let head = format!("{:<32} {:>10}  {}", row.name, row.size_label, row.caption());
    match (row.status, row.progress, row.error.as_deref()) {
        (FileStatus::Error, _, Some(error)) => format!("{head} ({error})"),
        (FileStatus::Uploading | FileStatus::Summarizing, Some(progress), _) => {
            format!("{head} {progress:>3}%")
        }
        _ => head,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: FileStatus, progress: Option<u8>, error: Option<&str>) -> FileRowView {
        FileRowView {
            name: "a.txt".to_string(),
            size_label: "1.5 KB".to_string(),
            status,
            progress,
            error: error.map(str::to_string),
            selected: false,
            has_summary: false,
        }
    }

    fn view(rows: Vec<FileRowView>) -> AppViewModel {
        AppViewModel {
            files: rows,
            ..AppViewModel::default()
        }
    }

    #[test]
    fn unchanged_rows_are_not_repeated() {
        let mut renderer = Renderer::new();
        let first = view(vec![row(FileStatus::Uploading, Some(50), None)]);
        assert_eq!(renderer.render(&first).len(), 1);
        assert!(renderer.render(&first).is_empty());

        let failed = view(vec![row(FileStatus::Error, None, Some("transfer-failed: timeout"))]);
        let lines = renderer.render(&failed);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Error (transfer-failed: timeout)"));
    }

    #[test]
    fn switching_to_chat_announces_the_session() {
        let mut renderer = Renderer::new();
        let mut chat = view(vec![row(FileStatus::Completed, None, None)]);
        chat.panel = Panel::Chat;
        chat.active_session = Some(1);
        chat.active_files = vec!["a.txt".to_string()];

        let lines = renderer.render(&chat);
        assert_eq!(lines.last().unwrap(), "Session 1 ready with 1 file(s)");
        assert!(renderer.render(&chat).is_empty());
    }
}
