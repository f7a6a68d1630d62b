//! Polling scheduler.
//!
//! One [`Scheduler`] owns every registered [`PlatformSource`](storewatch_source::PlatformSource),
//! the shared [`StateStore`](storewatch_storage::StateStore) and the
//! [`DeliverySink`](storewatch_notify::DeliverySink). Each platform gets its own
//! timer task; a failed cycle is logged and the next tick still fires.
//!
//! Per platform the state machine is `Idle → Polling → (Success | Failed) → Idle`.

mod error;
mod scheduler;
mod status;

pub use error::{CycleError, SchedulerError};
pub use scheduler::{
    CycleReport, Scheduler, SchedulerBuilder, SchedulerConfig, DEFAULT_INITIAL_DELAY,
    DEFAULT_POLL_INTERVAL,
};
pub use status::{
    CycleOutcome, HealthReport, PlatformHealth, PlatformPhase, PlatformStatus, SchedulerStatus,
};
