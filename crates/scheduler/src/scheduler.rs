use std::sync::Arc;
use std::time::{Duration, Instant};

use storewatch_core::timestamp::rfc3339;
use storewatch_core::Platform;
use storewatch_detect::{ChangeDetector, DetectorOptions, Processed};
use storewatch_notify::{Composer, DeliverySink};
use storewatch_source::PlatformSource;
use storewatch_storage::StateStore;
use time::OffsetDateTime;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::{CycleError, SchedulerError};
use crate::status::{
    CycleOutcome, HealthReport, PlatformHealth, PlatformPhase, PlatformStatus, SchedulerStatus,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(90);
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between polls of the same platform.
    pub poll_interval: Duration,
    /// Delay before each platform's first poll after `start`.
    pub initial_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

/// What a successful cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub platform: Platform,
    pub notifications: usize,
    pub duration: Duration,
}

// ──────────────────────────────────────────────
// Builder
// ──────────────────────────────────────────────

pub struct SchedulerBuilder {
    store: Arc<dyn StateStore>,
    sink: Arc<dyn DeliverySink>,
    sources: Vec<Arc<dyn PlatformSource>>,
    composer: Composer,
    detector_options: DetectorOptions,
    config: SchedulerConfig,
}

impl SchedulerBuilder {
    pub fn source(mut self, source: Arc<dyn PlatformSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn composer(mut self, composer: Composer) -> Self {
        self.composer = composer;
        self
    }

    pub fn detector_options(mut self, options: DetectorOptions) -> Self {
        self.detector_options = options;
        self
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Fails when no source is registered or a platform appears twice.
    pub fn build(self) -> Result<Scheduler, SchedulerError> {
        if self.sources.is_empty() {
            return Err(SchedulerError::NoPlatforms);
        }
        for (idx, source) in self.sources.iter().enumerate() {
            let platform = source.platform();
            if self.sources[..idx].iter().any(|s| s.platform() == platform) {
                return Err(SchedulerError::DuplicatePlatform(platform));
            }
        }

        let states = self
            .sources
            .iter()
            .map(|s| PlatformStatus::new(s.platform()))
            .collect();

        Ok(Scheduler {
            inner: Arc::new(Inner {
                detector: ChangeDetector::new(Arc::clone(&self.store), self.detector_options),
                store: self.store,
                sink: self.sink,
                sources: self.sources,
                composer: self.composer,
                config: self.config,
                states: Mutex::new(states),
                running: Mutex::new(None),
            }),
        })
    }
}

// ──────────────────────────────────────────────
// Scheduler
// ──────────────────────────────────────────────

/// Drives one polling loop per registered platform.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn StateStore>,
    sink: Arc<dyn DeliverySink>,
    sources: Vec<Arc<dyn PlatformSource>>,
    detector: ChangeDetector,
    composer: Composer,
    config: SchedulerConfig,
    /// Same order as `sources`.
    states: Mutex<Vec<PlatformStatus>>,
    running: Mutex<Option<RunHandle>>,
}

struct RunHandle {
    shutdown: watch::Sender<bool>,
    // Detached on stop; in-flight cycles run to completion.
    _tasks: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn builder(store: Arc<dyn StateStore>, sink: Arc<dyn DeliverySink>) -> SchedulerBuilder {
        SchedulerBuilder {
            store,
            sink,
            sources: Vec::new(),
            composer: Composer::new(),
            detector_options: DetectorOptions::default(),
            config: SchedulerConfig::default(),
        }
    }

    pub fn platforms(&self) -> Vec<Platform> {
        self.inner.sources.iter().map(|s| s.platform()).collect()
    }

    /// Validate every platform and the sink, then start one timer per platform.
    ///
    /// Nothing is scheduled unless every check passes.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut running = self.inner.running.lock().await;
        if running.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        for source in &self.inner.sources {
            source
                .validate_config()
                .map_err(|source_err| SchedulerError::Configuration {
                    platform: source.platform(),
                    source: source_err,
                })?;
        }
        if !self.inner.sink.check_connection().await {
            return Err(SchedulerError::SinkUnreachable {
                sink: self.inner.sink.name().to_string(),
            });
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let first_poll = OffsetDateTime::now_utc() + self.inner.config.initial_delay;
        {
            let mut states = self.inner.states.lock().await;
            for state in states.iter_mut() {
                state.next_poll_at = Some(rfc3339(first_poll));
            }
        }

        let tasks = self
            .inner
            .sources
            .iter()
            .map(|source| {
                let inner = Arc::clone(&self.inner);
                let platform = source.platform();
                let rx = shutdown_rx.clone();
                tokio::spawn(async move { poll_loop(inner, platform, rx).await })
            })
            .collect();

        *running = Some(RunHandle {
            shutdown,
            _tasks: tasks,
        });
        info!(
            platforms = ?self.platforms(),
            interval_secs = self.inner.config.poll_interval.as_secs(),
            "scheduler started"
        );
        Ok(())
    }

    /// Stop scheduling new cycles. A no-op when not running.
    pub async fn stop(&self) {
        let Some(handle) = self.inner.running.lock().await.take() else {
            debug!("stop called while not running");
            return;
        };
        // Receivers may already be gone if every loop exited.
        let _ = handle.shutdown.send(true);

        let mut states = self.inner.states.lock().await;
        for state in states.iter_mut() {
            state.next_poll_at = None;
        }
        info!("scheduler stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.inner.running.lock().await.is_some()
    }

    /// Run one cycle for `platform` now, outside the timer.
    pub async fn run_cycle(&self, platform: Platform) -> Result<CycleReport, CycleError> {
        self.inner.run_cycle(platform).await
    }

    pub async fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            running: self.is_running().await,
            poll_interval_secs: self.inner.config.poll_interval.as_secs(),
            platforms: self.inner.states.lock().await.clone(),
        }
    }

    /// Check every source, the store and the sink. Healthy only if all are.
    pub async fn health(&self) -> HealthReport {
        let mut platforms = Vec::with_capacity(self.inner.sources.len());
        for source in &self.inner.sources {
            let healthy = source.health_check().await;
            platforms.push(PlatformHealth {
                platform: source.platform(),
                healthy,
            });
        }
        {
            let mut states = self.inner.states.lock().await;
            for (state, check) in states.iter_mut().zip(&platforms) {
                state.last_health = Some(check.healthy);
            }
        }

        let store_ready = self.inner.store.is_ready();
        let sink_reachable = self.inner.sink.check_connection().await;
        let healthy = store_ready && sink_reachable && platforms.iter().all(|p| p.healthy);

        if healthy {
            debug!("health check passed");
        } else {
            warn!(store_ready, sink_reachable, platforms = ?platforms, "health check failed");
        }

        HealthReport {
            healthy,
            platforms,
            store_ready,
            sink_reachable,
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("platforms", &self.platforms())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

async fn poll_loop(inner: Arc<Inner>, platform: Platform, mut shutdown: watch::Receiver<bool>) {
    let period = inner.config.poll_interval;
    let first = tokio::time::Instant::now() + inner.config.initial_delay;
    let mut ticker = interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }
        if *shutdown.borrow() {
            break;
        }

        inner
            .set_next_poll(platform, OffsetDateTime::now_utc() + period)
            .await;
        // Errors are recorded and logged inside run_cycle.
        let _ = inner.run_cycle(platform).await;
    }
    debug!(platform = %platform, "poll loop exited");
}

impl Inner {
    fn source(&self, platform: Platform) -> Option<&Arc<dyn PlatformSource>> {
        self.sources.iter().find(|s| s.platform() == platform)
    }

    async fn set_next_poll(&self, platform: Platform, at: OffsetDateTime) {
        let mut states = self.states.lock().await;
        if let Some(state) = states.iter_mut().find(|s| s.platform == platform) {
            state.next_poll_at = Some(rfc3339(at));
        }
    }

    async fn set_phase(&self, platform: Platform, phase: PlatformPhase) {
        let mut states = self.states.lock().await;
        if let Some(state) = states.iter_mut().find(|s| s.platform == platform) {
            state.phase = phase;
        }
    }

    async fn record_outcome(&self, platform: Platform, outcome: CycleOutcome, duration: Duration) {
        let mut states = self.states.lock().await;
        if let Some(state) = states.iter_mut().find(|s| s.platform == platform) {
            state.phase = PlatformPhase::Idle;
            state.cycles += 1;
            if matches!(outcome, CycleOutcome::Failed { .. }) {
                state.failures += 1;
            }
            state.last_outcome = Some(outcome);
            state.last_duration_ms = Some(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
            state.last_finished_at = Some(rfc3339(OffsetDateTime::now_utc()));
        }
    }

    async fn run_cycle(&self, platform: Platform) -> Result<CycleReport, CycleError> {
        let source = self
            .source(platform)
            .ok_or(CycleError::UnknownPlatform(platform))?;

        self.set_phase(platform, PlatformPhase::Polling).await;
        debug!(platform = %platform, "poll cycle started");
        let started = Instant::now();

        let result = self.cycle(source.as_ref()).await;
        let duration = started.elapsed();
        let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(notifications) => {
                info!(
                    platform = %platform,
                    notifications,
                    duration_ms,
                    "poll cycle completed"
                );
                self.record_outcome(
                    platform,
                    CycleOutcome::Success {
                        notifications: *notifications,
                    },
                    duration,
                )
                .await;
            }
            Err(e) => {
                error!(platform = %platform, duration_ms, error = %e, "poll cycle failed");
                self.record_outcome(
                    platform,
                    CycleOutcome::Failed {
                        error: e.to_string(),
                    },
                    duration,
                )
                .await;
            }
        }

        result.map(|notifications| CycleReport {
            platform,
            notifications,
            duration,
        })
    }

    /// Fetch → detect → compose → deliver. Returns the number of notifications.
    ///
    /// A storage failure on some entities does not hold back the changes found
    /// on the others; it is reported after they are delivered.
    async fn cycle(&self, source: &dyn PlatformSource) -> Result<usize, CycleError> {
        let snapshot = source.fetch_snapshot().await?;
        let Processed { payloads, failures } = self
            .detector
            .process(&snapshot, OffsetDateTime::now_utc())
            .await;

        if !payloads.is_empty() {
            let message = self.composer.compose_batch(&payloads)?;
            if !self.sink.deliver(&message).await {
                return Err(CycleError::Delivery {
                    sink: self.sink.name().to_string(),
                    notifications: payloads.len(),
                });
            }
        }

        let failed = failures.len();
        match failures.into_iter().next() {
            Some(first) => Err(CycleError::Storage {
                failed,
                delivered: payloads.len(),
                source: first.error,
            }),
            None => Ok(payloads.len()),
        }
    }
}
