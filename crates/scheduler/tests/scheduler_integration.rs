//! Scheduler behaviour with in-memory sources, store and sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use storewatch_core::{
    AppStoreApp, AppStoreBuild, ObservedState, Platform, PlatformSnapshot, PlayStoreApp,
    PlayStoreRelease, PlayStoreTrack,
};
use storewatch_notify::RecordingSink;
use storewatch_scheduler::{
    CycleError, CycleOutcome, PlatformPhase, Scheduler, SchedulerConfig, SchedulerError,
};
use storewatch_source::FixedSource;
use storewatch_storage::{MemoryStateStore, StateStore, StorageError, StoredRecord};

const PACKAGE: &str = "com.example.droid";
const BUNDLE: &str = "com.example.phone";

fn play_snapshot(code: u64, status: &str) -> PlatformSnapshot {
    PlatformSnapshot::PlayStore {
        apps: vec![PlayStoreApp {
            package_name: PACKAGE.into(),
            title: Some("Droid".into()),
            tracks: vec![PlayStoreTrack {
                track: "production".into(),
                releases: vec![PlayStoreRelease {
                    version_codes: vec![code],
                    status: status.into(),
                    name: None,
                    user_fraction: None,
                }],
            }],
        }],
    }
}

fn app_snapshot(status: &str) -> PlatformSnapshot {
    PlatformSnapshot::AppStore {
        apps: vec![AppStoreApp {
            bundle_id: BUNDLE.into(),
            name: "Phone".into(),
            icon_url: None,
            builds: vec![AppStoreBuild {
                version: "1.0".into(),
                build_number: "1".into(),
                status: status.into(),
                uploaded_at: "2025-01-01T00:00:00Z".into(),
            }],
            version_state: None,
        }],
    }
}

fn config() -> SchedulerConfig {
    SchedulerConfig {
        poll_interval: Duration::from_secs(90),
        initial_delay: Duration::from_secs(1),
    }
}

struct Fixture {
    scheduler: Scheduler,
    app: Arc<FixedSource>,
    play: Arc<FixedSource>,
    sink: Arc<RecordingSink>,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryStateStore::new());
    let sink = Arc::new(RecordingSink::new());
    let app = Arc::new(FixedSource::new(app_snapshot("PROCESSING"), vec![BUNDLE.into()]));
    let play = Arc::new(FixedSource::new(play_snapshot(10, "completed"), vec![PACKAGE.into()]));
    let scheduler = Scheduler::builder(store, sink.clone())
        .source(app.clone())
        .source(play.clone())
        .config(config())
        .build()
        .unwrap();
    Fixture {
        scheduler,
        app,
        play,
        sink,
    }
}

#[tokio::test(start_paused = true)]
async fn failing_platform_does_not_block_the_other() {
    let f = fixture();
    f.app.fail_with("connect timeout").await;
    f.scheduler.start().await.unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(f.app.fetch_count(), 1);
    assert_eq!(f.play.fetch_count(), 1);
    assert_eq!(f.sink.len().await, 1);

    f.play.set_snapshot(play_snapshot(11, "completed")).await;
    tokio::time::sleep(Duration::from_secs(90)).await;
    assert_eq!(f.app.fetch_count(), 2, "failed platform keeps its timer");
    assert_eq!(f.play.fetch_count(), 2);
    assert_eq!(f.sink.len().await, 2);

    let status = f.scheduler.status().await;
    let app = &status.platforms[0];
    assert_eq!(app.platform, Platform::AppStore);
    assert_eq!(app.failures, 2);
    assert!(matches!(app.last_outcome, Some(CycleOutcome::Failed { .. })));
    let play = &status.platforms[1];
    assert_eq!(play.failures, 0);
    assert_eq!(
        play.last_outcome,
        Some(CycleOutcome::Success { notifications: 1 })
    );
    assert_eq!(play.phase, PlatformPhase::Idle);

    f.scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn unchanged_snapshot_sends_nothing_on_later_ticks() {
    let f = fixture();
    f.scheduler.start().await.unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    // One cycle each, one message each.
    assert_eq!(f.sink.len().await, 2);

    tokio::time::sleep(Duration::from_secs(180)).await;
    assert_eq!(f.play.fetch_count(), 3);
    assert_eq!(f.sink.len().await, 2);
    f.scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_prevents_further_cycles_and_is_idempotent() {
    let f = fixture();
    f.scheduler.stop().await;

    f.scheduler.start().await.unwrap();
    assert!(f.scheduler.is_running().await);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    f.scheduler.stop().await;
    f.scheduler.stop().await;
    assert!(!f.scheduler.is_running().await);

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(f.play.fetch_count(), 1);
    let status = f.scheduler.status().await;
    assert!(!status.running);
    assert!(status.platforms.iter().all(|p| p.next_poll_at.is_none()));
}

#[tokio::test]
async fn start_twice_is_rejected() {
    let f = fixture();
    f.scheduler.start().await.unwrap();
    assert!(matches!(
        f.scheduler.start().await,
        Err(SchedulerError::AlreadyRunning)
    ));
    f.scheduler.stop().await;
}

#[tokio::test]
async fn invalid_configuration_aborts_start() {
    let store = Arc::new(MemoryStateStore::new());
    let sink = Arc::new(RecordingSink::new());
    let bad = Arc::new(FixedSource::new(
        play_snapshot(1, "completed"),
        vec!["not-a-package".into()],
    ));
    let scheduler = Scheduler::builder(store, sink)
        .source(bad.clone())
        .build()
        .unwrap();

    let err = scheduler.start().await.unwrap_err();
    assert!(
        matches!(err, SchedulerError::Configuration { platform: Platform::PlayStore, .. }),
        "{err}"
    );
    assert!(!scheduler.is_running().await);
    assert_eq!(bad.fetch_count(), 0);
}

#[tokio::test]
async fn unreachable_sink_aborts_start() {
    let f = fixture();
    f.sink.set_reachable(false);
    assert!(matches!(
        f.scheduler.start().await,
        Err(SchedulerError::SinkUnreachable { .. })
    ));
    assert!(!f.scheduler.is_running().await);
}

#[tokio::test]
async fn builder_rejects_empty_and_duplicate_platforms() {
    let store: Arc<MemoryStateStore> = Arc::new(MemoryStateStore::new());
    let sink = Arc::new(RecordingSink::new());
    assert!(matches!(
        Scheduler::builder(store.clone(), sink.clone()).build(),
        Err(SchedulerError::NoPlatforms)
    ));

    let a = Arc::new(FixedSource::new(play_snapshot(1, "completed"), vec![PACKAGE.into()]));
    let b = Arc::new(FixedSource::new(play_snapshot(2, "completed"), vec![PACKAGE.into()]));
    assert!(matches!(
        Scheduler::builder(store, sink).source(a).source(b).build(),
        Err(SchedulerError::DuplicatePlatform(Platform::PlayStore))
    ));
}

#[tokio::test]
async fn run_cycle_reports_and_batches() {
    let f = fixture();
    let report = f.scheduler.run_cycle(Platform::PlayStore).await.unwrap();
    assert_eq!(report.notifications, 1);

    let again = f.scheduler.run_cycle(Platform::PlayStore).await.unwrap();
    assert_eq!(again.notifications, 0);

    let messages = f.sink.messages().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].text.contains("New release detected"));
}

#[tokio::test]
async fn rejected_delivery_is_a_cycle_error_and_state_is_kept() {
    let f = fixture();
    f.sink.set_accepting(false);
    let err = f
        .scheduler
        .run_cycle(Platform::AppStore)
        .await
        .unwrap_err();
    assert!(matches!(err, CycleError::Delivery { notifications: 1, .. }), "{err}");

    // Not re-sent: the state was persisted before delivery.
    f.sink.set_accepting(true);
    let report = f.scheduler.run_cycle(Platform::AppStore).await.unwrap();
    assert_eq!(report.notifications, 0);
    assert!(f.sink.is_empty().await);
}

#[tokio::test]
async fn health_is_the_and_of_all_checks() {
    let f = fixture();
    assert!(f.scheduler.health().await.healthy);

    f.play.set_healthy(false);
    let report = f.scheduler.health().await;
    assert!(!report.healthy);
    assert!(report.store_ready);
    assert!(report.sink_reachable);
    assert_eq!(
        report
            .platforms
            .iter()
            .filter(|p| !p.healthy)
            .map(|p| p.platform)
            .collect::<Vec<_>>(),
        vec![Platform::PlayStore]
    );

    let status = f.scheduler.status().await;
    assert_eq!(status.platforms[1].last_health, Some(false));

    f.play.set_healthy(true);
    f.sink.set_reachable(false);
    assert!(!f.scheduler.health().await.healthy);
}

// ── Storage failure ──────────────────────────────────────────────────────────

struct BrokenStore;

#[async_trait]
impl StateStore for BrokenStore {
    async fn get(&self, _: &str, _: &str) -> Result<Option<StoredRecord>, StorageError> {
        Err(StorageError::Backend("disk gone".into()))
    }

    async fn set(&self, _: &str, _: &str, _: ObservedState) -> Result<(), StorageError> {
        Err(StorageError::Backend("disk gone".into()))
    }

    async fn delete(&self, _: &str, _: &str) -> Result<(), StorageError> {
        Err(StorageError::Backend("disk gone".into()))
    }

    async fn keys(&self, _: Option<&str>) -> Result<Vec<String>, StorageError> {
        Ok(Vec::new())
    }

    fn is_ready(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn storage_failure_aborts_cycle_without_delivery() {
    let sink = Arc::new(RecordingSink::new());
    let source = Arc::new(FixedSource::new(play_snapshot(1, "completed"), vec![PACKAGE.into()]));
    let scheduler = Scheduler::builder(Arc::new(BrokenStore), sink.clone())
        .source(source)
        .build()
        .unwrap();

    let err = scheduler.run_cycle(Platform::PlayStore).await.unwrap_err();
    assert!(matches!(err, CycleError::Storage { delivered: 0, .. }), "{err}");
    assert!(sink.is_empty().await);
    assert!(!scheduler.health().await.store_ready);
}

/// Memory store whose next `set` fails once after `fail_next_set`.
#[derive(Default)]
struct HiccupStore {
    inner: MemoryStateStore,
    fail_next_set: AtomicBool,
}

#[async_trait]
impl StateStore for HiccupStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredRecord>, StorageError> {
        self.inner.get(namespace, key).await
    }

    async fn set(
        &self,
        namespace: &str,
        key: &str,
        state: ObservedState,
    ) -> Result<(), StorageError> {
        if self.fail_next_set.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Backend("disk full".into()));
        }
        self.inner.set(namespace, key, state).await
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.inner.delete(namespace, key).await
    }

    async fn keys(&self, namespace: Option<&str>) -> Result<Vec<String>, StorageError> {
        self.inner.keys(namespace).await
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[tokio::test]
async fn partial_storage_failure_still_delivers_and_retries_the_rest() {
    let store = Arc::new(HiccupStore::default());
    let sink = Arc::new(RecordingSink::new());
    let snapshot = PlatformSnapshot::PlayStore {
        apps: vec![PlayStoreApp {
            package_name: PACKAGE.into(),
            title: Some("Droid".into()),
            tracks: ["alpha", "beta"]
                .into_iter()
                .map(|track| PlayStoreTrack {
                    track: track.into(),
                    releases: vec![PlayStoreRelease {
                        version_codes: vec![3],
                        status: "completed".into(),
                        name: None,
                        user_fraction: None,
                    }],
                })
                .collect(),
        }],
    };
    let source = Arc::new(FixedSource::new(snapshot, vec![PACKAGE.into()]));
    let scheduler = Scheduler::builder(store.clone(), sink.clone())
        .source(source)
        .build()
        .unwrap();

    // First record write (alpha) fails; beta is stored and delivered.
    store.fail_next_set.store(true, Ordering::SeqCst);
    let err = scheduler.run_cycle(Platform::PlayStore).await.unwrap_err();
    assert!(
        matches!(err, CycleError::Storage { failed: 1, delivered: 1, .. }),
        "{err}"
    );
    assert_eq!(sink.len().await, 1);

    let report = scheduler.run_cycle(Platform::PlayStore).await.unwrap();
    assert_eq!(report.notifications, 1);
    assert_eq!(sink.len().await, 2);

    let report = scheduler.run_cycle(Platform::PlayStore).await.unwrap();
    assert_eq!(report.notifications, 0);
    assert_eq!(sink.len().await, 2);
}
