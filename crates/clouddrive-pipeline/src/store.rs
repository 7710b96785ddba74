//! In-memory file record store.
//!
//! Single source of truth for uploaded records during a session. Records are
//! created once; afterwards only `state`/`progress` (as an atomic pair) and
//! the analysis aggregate may change, and never once a terminal state has
//! been reached.

use std::sync::Mutex;

use uuid::Uuid;

use clouddrive_core::models::{AnalysisFragment, FileRecord, ProcessingState};

/// Ordering of a record listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// Upload time descending (newest first).
    Recent,
    /// Name ascending, case-insensitive.
    Drive,
}

#[derive(Debug, Default)]
pub struct FileStore {
    records: Mutex<Vec<FileRecord>>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record and return its id.
    pub fn create(&self, record: FileRecord) -> Uuid {
        let id = record.id;
        self.records.lock().unwrap().push(record);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<FileRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Snapshot of all records in the requested order. Both orders use a
    /// stable sort, so records that compare equal keep insertion order.
    pub fn list(&self, order: ListOrder) -> Vec<FileRecord> {
        let mut records = self.records.lock().unwrap().clone();
        match order {
            ListOrder::Recent => records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at)),
            ListOrder::Drive => records.sort_by_key(|r| r.name.to_lowercase()),
        }
        records
    }

    /// Overwrite state and progress together. A no-op when the id is unknown
    /// or the record has already reached a terminal state.
    pub fn set_state(&self, id: Uuid, state: ProcessingState, progress: u8) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            if record.state.is_terminal() {
                tracing::warn!(
                    record_id = %id,
                    current = %record.state,
                    attempted = %state,
                    "Ignoring state patch on terminal record"
                );
                return;
            }
            record.state = state;
            record.progress = progress;
        }
    }

    /// Field-wise union of a fragment into the record's analysis aggregate.
    /// A no-op when the id is unknown.
    pub fn merge_analysis(&self, id: Uuid, fragment: &AnalysisFragment) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            record
                .analysis
                .get_or_insert_with(Default::default)
                .merge(fragment);
        }
    }

    /// Sum of all stored record sizes, the storage-used figure.
    pub fn total_bytes(&self) -> u64 {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.size_bytes)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}
