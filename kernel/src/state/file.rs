// JSON File State Store
//
// Keeps tracked records in a single JSON document. The whole file is
// rewritten through a temporary sibling on every mutation.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{StateError, StateStore};
use crate::record::SettingsRecord;

const STATE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDocument {
    version: u32,
    records: BTreeMap<String, SettingsRecord>,
}

#[derive(Debug)]
pub struct JsonFileStateStore {
    path: PathBuf,
    records: BTreeMap<String, SettingsRecord>,
}

impl JsonFileStateStore {
    /// Open `path`, treating a missing file as empty state.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StateError> {
        let path = path.into();

        let records = match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str::<StateDocument>(&data)?.records,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), records = records.len(), "opened state file");
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, records: &BTreeMap<String, SettingsRecord>) -> Result<(), StateError> {
        let doc = StateDocument {
            version: STATE_FORMAT_VERSION,
            records: records.clone(),
        };
        let data = serde_json::to_vec_pretty(&doc)?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StateStore for JsonFileStateStore {
    fn get(&self, id: &str) -> Result<Option<SettingsRecord>, StateError> {
        Ok(self.records.get(id).cloned())
    }

    fn put(&mut self, record: SettingsRecord) -> Result<(), StateError> {
        let mut next = self.records.clone();
        next.insert(record.id.clone(), record);
        self.flush(&next)?;
        self.records = next;
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<Option<SettingsRecord>, StateError> {
        if !self.records.contains_key(id) {
            return Ok(None);
        }

        let mut next = self.records.clone();
        let removed = next.remove(id);
        self.flush(&next)?;
        self.records = next;
        Ok(removed)
    }

    fn list(&self) -> Result<Vec<SettingsRecord>, StateError> {
        Ok(self.records.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("sastsync-state-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn missing_file_is_empty_state() {
        let store = JsonFileStateStore::open(temp_path()).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn records_survive_reopen() {
        let path = temp_path();

        let mut store = JsonFileStateStore::open(&path).unwrap();
        store.put(SettingsRecord::planned("org-a", true)).unwrap();
        store.put(SettingsRecord::planned("org-b", false)).unwrap();
        store.remove("org-b").unwrap();

        let reopened = JsonFileStateStore::open(&path).unwrap();
        let records = reopened.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "org-a");

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn corrupt_file_is_format_error() {
        let path = temp_path();
        fs::write(&path, "not json").unwrap();

        let err = JsonFileStateStore::open(&path).unwrap_err();
        assert!(matches!(err, StateError::Format(_)));

        fs::remove_file(path).unwrap();
    }
}
