//! Platform sources: where snapshots come from.
//!
//! A [`PlatformSource`] fetches the current state of one platform and hands
//! it back as a normalized [`PlatformSnapshot`]. The vendor APIs themselves are
//! not spoken here; snapshots arrive already normalized from
//!
//! - [`FileSnapshotSource`] -- a JSON file re-read on every poll
//! - [`HttpSnapshotSource`] -- an HTTP bridge returning the same JSON
//! - [`FixedSource`] -- an in-memory snapshot, for tests and demos

mod error;
mod file;
mod fixed;
mod http;
pub mod validate;

use async_trait::async_trait;
use storewatch_core::{Platform, PlatformSnapshot};

pub use error::{ConfigurationError, FetchError};
pub use file::FileSnapshotSource;
pub use fixed::FixedSource;
pub use http::HttpSnapshotSource;

/// One platform's data source, as seen by the scheduler.
#[async_trait]
pub trait PlatformSource: Send + Sync {
    fn platform(&self) -> Platform;

    /// Check identifiers and location. Called once before the scheduler starts.
    fn validate_config(&self) -> Result<(), ConfigurationError>;

    /// Fetch the current snapshot, filtered to the configured identifiers.
    async fn fetch_snapshot(&self) -> Result<PlatformSnapshot, FetchError>;

    /// Whether the backend is currently reachable. Never errors.
    async fn health_check(&self) -> bool;
}

/// Reject a snapshot tagged with another platform.
pub(crate) fn ensure_platform(
    expected: Platform,
    snapshot: &PlatformSnapshot,
) -> Result<(), FetchError> {
    let found = snapshot.platform();
    if found != expected {
        return Err(FetchError::PlatformMismatch { expected, found });
    }
    Ok(())
}
