use std::collections::BTreeMap;

use crate::{FileRecord, RecordStore};

pub type SessionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Files that were the query context when the message was sent.
    pub files: Vec<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            files,
        }
    }

    pub fn assistant(content: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            files,
        }
    }
}

/// A chat context. File names are weak references into the [`RecordStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    messages: Vec<ChatMessage>,
    files: Vec<String>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            messages: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn file_names(&self) -> &[String] {
        &self.files
    }
}

/// Owns every session and their file scoping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionBinder {
    sessions: BTreeMap<SessionId, Session>,
    next_id: SessionId,
}

impl SessionBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_session(&mut self) -> &Session {
        self.next_id += 1;
        let id = self.next_id;
        self.sessions.entry(id).or_insert_with(|| Session::new(id))
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Replaces the session's file set; duplicate names collapse to one.
    /// Returns false for an unknown session.
    pub fn bind_files(&mut self, id: SessionId, names: &[String]) -> bool {
        let Some(session) = self.sessions.get_mut(&id) else {
            return false;
        };
        let mut files: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !files.contains(name) {
                files.push(name.clone());
            }
        }
        session.files = files;
        true
    }

    /// Records bound to the session, resolved against the store at call
    /// time. Names no longer in the store are skipped.
    pub fn active_files(&self, id: SessionId, store: &RecordStore) -> Vec<FileRecord> {
        self.sessions
            .get(&id)
            .map(|session| {
                session
                    .files
                    .iter()
                    .filter_map(|name| store.get(name).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn append_message(&mut self, id: SessionId, message: ChatMessage) -> bool {
        match self.sessions.get_mut(&id) {
            Some(session) => {
                session.messages.push(message);
                true
            }
            None => false,
        }
    }
}
