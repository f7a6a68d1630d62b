use storewatch_core::Platform;
use storewatch_notify::ComposeError;
use storewatch_source::{ConfigurationError, FetchError};
use storewatch_storage::StorageError;

/// Startup and lifecycle failures. Any of these aborts `start`.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("no platforms registered")]
    NoPlatforms,

    #[error("{0} registered more than once")]
    DuplicatePlatform(Platform),

    #[error("{platform} configuration invalid: {source}")]
    Configuration {
        platform: Platform,
        #[source]
        source: ConfigurationError,
    },

    #[error("delivery sink {sink} is unreachable")]
    SinkUnreachable { sink: String },

    #[error("scheduler is already running")]
    AlreadyRunning,
}

/// Why a single poll cycle failed. Logged, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("{0} is not registered")]
    UnknownPlatform(Platform),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Some entities could not be inspected. Changes found on the others were
    /// still delivered; the failed ones are retried next cycle.
    #[error("state store failure on {failed} entity record(s): {source}")]
    Storage {
        failed: usize,
        delivered: usize,
        #[source]
        source: StorageError,
    },

    #[error("compose failed: {0}")]
    Compose(#[from] ComposeError),

    #[error("sink {sink} rejected {notifications} notification(s)")]
    Delivery { sink: String, notifications: usize },
}
