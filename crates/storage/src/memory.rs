use async_trait::async_trait;
use storewatch_core::ObservedState;
use tokio::sync::RwLock;

use crate::table::RecordTable;
use crate::{StateStore, StorageError, StoredRecord};

/// Process-local store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    table: RwLock<RecordTable>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries across all namespaces.
    pub async fn len(&self) -> usize {
        self.table.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredRecord>, StorageError> {
        Ok(self.table.read().await.get(namespace, key).cloned())
    }

    async fn set(
        &self,
        namespace: &str,
        key: &str,
        state: ObservedState,
    ) -> Result<(), StorageError> {
        let record = RecordTable::make_record(namespace, key, state);
        self.table.write().await.insert(record);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.table.write().await.remove(namespace, key);
        Ok(())
    }

    async fn keys(&self, namespace: Option<&str>) -> Result<Vec<String>, StorageError> {
        Ok(self.table.read().await.keys(namespace))
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::run_conformance_suite;

    #[tokio::test]
    async fn memory_store_passes_conformance() {
        let report = run_conformance_suite(|| async { MemoryStateStore::new() }).await;
        assert_eq!(report.failed, 0, "{report}");
        assert!(report.total > 0);
    }
}
