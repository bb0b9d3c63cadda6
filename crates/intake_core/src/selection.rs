use std::collections::BTreeSet;

use crate::{FileRecord, RecordStore};

/// File names currently marked as query context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    names: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the name if absent, removes it otherwise.
    pub fn toggle(&mut self, name: &str) {
        if !self.names.remove(name) {
            self.names.insert(name.to_string());
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Selected records in store order; names missing from the store are skipped.
    pub fn current(&self, store: &RecordStore) -> Vec<FileRecord> {
        store
            .records()
            .iter()
            .filter(|record| self.names.contains(&record.name))
            .cloned()
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}
