use std::collections::BTreeMap;

use crate::view_model::{AppViewModel, FileRowView};
use crate::{
    ChatMessage, FileRecord, MergeOutcome, RecordStore, Selection, Session, SessionBinder,
    SessionId,
};

/// Error message carried by records abandoned on teardown.
pub const CANCELLED_CAUSE: &str = "cancelled";

/// Which surface the consumer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Upload,
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    store: RecordStore,
    sessions: SessionBinder,
    active_session: Option<SessionId>,
    selection: Selection,
    summaries: BTreeMap<String, String>,
    panel: Panel,
    query_pending: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let active = self.active_session.and_then(|id| self.sessions.session(id));
        AppViewModel {
            panel: self.panel,
            files: self
                .store
                .records()
                .iter()
                .map(|record| FileRowView {
                    name: record.name.clone(),
                    size_label: record.size_label.clone(),
                    status: record.status,
                    progress: record.progress,
                    error: record.error.clone(),
                    selected: self.selection.is_selected(&record.name),
                    has_summary: self.summaries.contains_key(&record.name),
                })
                .collect(),
            selected: self.selected_names(),
            active_session: self.active_session,
            session_count: self.sessions.len(),
            active_files: active
                .map(|_| {
                    self.active_files()
                        .into_iter()
                        .map(|record| record.name)
                        .collect()
                })
                .unwrap_or_default(),
            messages: active
                .map(|session| session.messages().to_vec())
                .unwrap_or_default(),
            query_pending: self.query_pending,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn records(&self) -> &[FileRecord] {
        self.store.records()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn selected_records(&self) -> Vec<FileRecord> {
        self.selection.current(&self.store)
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selection.is_selected(name)
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.active_session
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.session(id)
    }

    /// Files bound to the active session, resolved against the store.
    pub fn active_files(&self) -> Vec<FileRecord> {
        self.active_session
            .map(|id| self.sessions.active_files(id, &self.store))
            .unwrap_or_default()
    }

    pub fn summary(&self, name: &str) -> Option<&str> {
        self.summaries.get(name).map(String::as_str)
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn query_pending(&self) -> bool {
        self.query_pending
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn merge_records(&mut self, updates: &[FileRecord]) -> MergeOutcome {
        let outcome = self.store.merge(updates);
        if outcome.changed {
            self.mark_dirty();
        }
        outcome
    }

    /// Binds the completed files to the active session, creating one if none
    /// exists. Rebinding to a different set clears the selection.
    pub(crate) fn bind_completed_files(&mut self) {
        let id = match self.active_session {
            Some(id) => id,
            None => {
                let id = self.sessions.create_session().id;
                self.active_session = Some(id);
                self.mark_dirty();
                id
            }
        };
        let completed = self.store.completed_names();
        let unchanged = self
            .sessions
            .session(id)
            .is_some_and(|session| session.file_names() == completed.as_slice());
        if unchanged {
            return;
        }
        self.sessions.bind_files(id, &completed);
        self.selection.clear();
        self.mark_dirty();
    }

    pub(crate) fn forget_summaries<'a>(&mut self, names: impl Iterator<Item = &'a str>) {
        for name in names {
            if self.summaries.remove(name).is_some() {
                self.mark_dirty();
            }
        }
    }

    pub(crate) fn set_summary(&mut self, name: String, summary: String) {
        self.summaries.insert(name, summary);
        self.mark_dirty();
    }

    pub(crate) fn toggle_selection(&mut self, name: &str) -> bool {
        if !self.store.contains(name) {
            return false;
        }
        self.selection.toggle(name);
        self.mark_dirty();
        true
    }

    pub(crate) fn selected_names(&self) -> Vec<String> {
        self.selected_records()
            .into_iter()
            .map(|record| record.name)
            .collect()
    }

    pub(crate) fn start_new_session(&mut self) -> SessionId {
        let id = self.sessions.create_session().id;
        self.enter_session(id);
        id
    }

    pub(crate) fn activate_session(&mut self, id: SessionId) -> bool {
        if !self.sessions.contains(id) || self.active_session == Some(id) {
            return false;
        }
        self.enter_session(id);
        true
    }

    fn enter_session(&mut self, id: SessionId) {
        self.active_session = Some(id);
        self.selection.clear();
        self.query_pending = false;
        self.mark_dirty();
    }

    pub(crate) fn set_panel(&mut self, panel: Panel) {
        if self.panel != panel {
            self.panel = panel;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_query_pending(&mut self, pending: bool) {
        if self.query_pending != pending {
            self.query_pending = pending;
            self.mark_dirty();
        }
    }

    pub(crate) fn append_message(&mut self, id: SessionId, message: ChatMessage) -> bool {
        let appended = self.sessions.append_message(id, message);
        if appended {
            self.mark_dirty();
        }
        appended
    }
}
