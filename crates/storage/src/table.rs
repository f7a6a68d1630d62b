//! In-memory flat key space with namespace tag checks, shared by backends.

use std::collections::BTreeMap;

use storewatch_core::timestamp::now_rfc3339;
use storewatch_core::ObservedState;

use crate::record::StoredRecord;

#[derive(Debug, Default)]
pub(crate) struct RecordTable {
    entries: BTreeMap<String, StoredRecord>,
}

impl RecordTable {
    pub(crate) fn get(&self, namespace: &str, key: &str) -> Option<&StoredRecord> {
        self.entries.get(key).filter(|r| r.namespace == namespace)
    }

    /// Build the record `set` would write, without inserting it.
    pub(crate) fn make_record(namespace: &str, key: &str, state: ObservedState) -> StoredRecord {
        StoredRecord {
            key: key.to_string(),
            namespace: namespace.to_string(),
            state,
            written_at: now_rfc3339(),
        }
    }

    pub(crate) fn insert(&mut self, record: StoredRecord) {
        self.entries.insert(record.key.clone(), record);
    }

    /// Remove `key` when owned by `namespace`. Returns whether anything was removed.
    pub(crate) fn remove(&mut self, namespace: &str, key: &str) -> bool {
        if self.get(namespace, key).is_none() {
            return false;
        }
        self.entries.remove(key).is_some()
    }

    /// Unconditional removal, used when replaying a tombstone.
    pub(crate) fn remove_raw(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub(crate) fn keys(&self, namespace: Option<&str>) -> Vec<String> {
        self.entries
            .values()
            .filter(|r| namespace.map_or(true, |ns| r.namespace == ns))
            .map(|r| r.key.clone())
            .collect()
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &StoredRecord> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
