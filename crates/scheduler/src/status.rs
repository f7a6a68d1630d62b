use serde::Serialize;
use storewatch_core::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformPhase {
    Idle,
    Polling,
}

/// How the most recent cycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CycleOutcome {
    Success { notifications: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformStatus {
    pub platform: Platform,
    pub phase: PlatformPhase,
    pub last_outcome: Option<CycleOutcome>,
    pub last_duration_ms: Option<u64>,
    /// RFC 3339.
    pub last_finished_at: Option<String>,
    /// RFC 3339. `None` while the scheduler is stopped.
    pub next_poll_at: Option<String>,
    pub cycles: u64,
    pub failures: u64,
    /// Result of the most recent `health()` call.
    pub last_health: Option<bool>,
}

impl PlatformStatus {
    pub(crate) fn new(platform: Platform) -> Self {
        Self {
            platform,
            phase: PlatformPhase::Idle,
            last_outcome: None,
            last_duration_ms: None,
            last_finished_at: None,
            next_poll_at: None,
            cycles: 0,
            failures: 0,
            last_health: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub poll_interval_secs: u64,
    pub platforms: Vec<PlatformStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformHealth {
    pub platform: Platform,
    pub healthy: bool,
}

/// AND of every platform check, store readiness and sink reachability.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub platforms: Vec<PlatformHealth>,
    pub store_ready: bool,
    pub sink_reachable: bool,
}
