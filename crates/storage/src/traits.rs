use async_trait::async_trait;
use storewatch_core::ObservedState;

use crate::error::StorageError;
use crate::record::StoredRecord;

/// Namespaced key → record persistence for last-known entity state.
///
/// ## Namespace semantics
///
/// Keys live in a single flat space shared by all namespaces. `set` tags the
/// record with its namespace; `get`, `has` and `delete` behave as if the key
/// were absent when the stored tag differs from the requested namespace.
/// A `set` under another namespace replaces the entry (last writer owns it).
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static`: poll cycles for different
/// platforms share one store and may interleave calls freely.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Read the record for `key` if it exists under `namespace`.
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredRecord>, StorageError>;

    /// Write (or overwrite) the record for `key`, tagging it with `namespace`.
    async fn set(
        &self,
        namespace: &str,
        key: &str,
        state: ObservedState,
    ) -> Result<(), StorageError>;

    /// Whether `key` exists under `namespace`.
    async fn has(&self, namespace: &str, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(namespace, key).await?.is_some())
    }

    /// Remove `key` if it exists under `namespace`; otherwise a no-op.
    async fn delete(&self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// All keys owned by `namespace`, or every key when `None`. Sorted.
    async fn keys(&self, namespace: Option<&str>) -> Result<Vec<String>, StorageError>;

    /// Whether the backend can currently serve reads and writes.
    fn is_ready(&self) -> bool;
}
