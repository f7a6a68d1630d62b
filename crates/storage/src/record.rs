use serde::{Deserialize, Serialize};
use storewatch_core::ObservedState;

/// The persisted form of the last observed state of one entity.
///
/// Every record is tagged with the namespace that wrote it; reads under a
/// different namespace treat the key as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub key: String,
    pub namespace: String,
    pub state: ObservedState,
    /// RFC 3339 timestamp of the write.
    pub written_at: String,
}
