// Tracked State
//
// Records a host is currently managing, keyed by id. The reconciler
// never touches this; hosts persist whatever it returns.

pub mod drift;
pub mod file;

use std::collections::BTreeMap;

use crate::record::SettingsRecord;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Storage backend for tracked records.
///
/// Implementations must:
/// - hold at most one record per id
/// - make `put` fully replace any record with the same id
/// - leave existing records untouched when an operation fails
pub trait StateStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<SettingsRecord>, StateError>;

    fn put(&mut self, record: SettingsRecord) -> Result<(), StateError>;

    /// Stop tracking `id`, returning the record that was dropped.
    fn remove(&mut self, id: &str) -> Result<Option<SettingsRecord>, StateError>;

    /// All tracked records, ordered by id.
    fn list(&self) -> Result<Vec<SettingsRecord>, StateError>;
}

#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    records: BTreeMap<String, SettingsRecord>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self, id: &str) -> Result<Option<SettingsRecord>, StateError> {
        Ok(self.records.get(id).cloned())
    }

    fn put(&mut self, record: SettingsRecord) -> Result<(), StateError> {
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<Option<SettingsRecord>, StateError> {
        Ok(self.records.remove(id))
    }

    fn list(&self) -> Result<Vec<SettingsRecord>, StateError> {
        Ok(self.records.values().cloned().collect())
    }
}
