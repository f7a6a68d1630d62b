//! StateStore abstraction for storewatch.
//!
//! A store remembers the last [`ObservedState`](storewatch_core::ObservedState)
//! seen for every tracked entity, partitioned by platform namespace over one
//! flat key space. Backends:
//!
//! - [`MemoryStateStore`] -- process-local, used by tests and dry runs
//! - [`FileStateStore`] -- append-only JSON-lines log, replayed on open
//!
//! Every backend is expected to pass [`conformance::run_conformance_suite`].

pub mod conformance;
mod error;
mod file;
mod memory;
mod record;
mod table;
mod traits;

pub use error::StorageError;
pub use file::FileStateStore;
pub use memory::MemoryStateStore;
pub use record::StoredRecord;
pub use traits::StateStore;
