use std::collections::HashMap;

use crate::{FileRecord, FileStatus};

/// Result of one merge call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub records: Vec<FileRecord>,
    /// Set once per call when any update in the batch reported `Completed`.
    pub batch_ready: bool,
    /// Whether any record was inserted or replaced.
    pub changed: bool,
}

/// Merges status updates into the current record list.
///
/// An update replaces the existing entry only when its status or progress
/// differs, so repeated updates are suppressed. Output keeps the order of
/// `current`, followed by new names in the order they first appear in
/// `updates`.
pub fn merge(current: &[FileRecord], updates: &[FileRecord]) -> MergeOutcome {
    let mut records = current.to_vec();
    let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        index.insert(record.name.clone(), position);
    }

    let mut changed = false;
    for update in updates {
        match index.get(&update.name) {
            Some(&position) => {
                let existing = &records[position];
                if existing.status != update.status || existing.progress != update.progress {
                    records[position] = update.clone();
                    changed = true;
                }
            }
            None => {
                index.insert(update.name.clone(), records.len());
                records.push(update.clone());
                changed = true;
            }
        }
    }

    let batch_ready = updates
        .iter()
        .any(|update| update.status == FileStatus::Completed);

    MergeOutcome {
        records,
        batch_ready,
        changed,
    }
}

/// Single-owner holder of the canonical record list.
///
/// All writes go through [`RecordStore::merge`]; `&mut self` keeps merges
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordStore {
    records: Vec<FileRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies updates and returns whether the batch reported a completion.
    pub fn merge(&mut self, updates: &[FileRecord]) -> MergeOutcome {
        let outcome = merge(&self.records, updates);
        if outcome.changed {
            self.records = outcome.records.clone();
        }
        outcome
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Snapshot of the latest merged list.
    pub fn snapshot(&self) -> Vec<FileRecord> {
        self.records.clone()
    }

    pub fn get(&self, name: &str) -> Option<&FileRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Names of every record currently `Completed`, in store order.
    pub fn completed_names(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|record| record.status == FileStatus::Completed)
            .map(|record| record.name.clone())
            .collect()
    }

    /// Terminal `Error` records for everything still in flight.
    pub fn cancellation_updates(&self, message: &str) -> Vec<FileRecord> {
        self.records
            .iter()
            .filter(|record| !record.status.is_terminal())
            .map(|record| record.failed(message))
            .collect()
    }
}
