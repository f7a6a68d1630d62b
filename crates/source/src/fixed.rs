use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use storewatch_core::{Platform, PlatformSnapshot};
use tokio::sync::Mutex;

use crate::validate::validate_identifiers;
use crate::{ConfigurationError, FetchError, PlatformSource};

#[derive(Debug, Clone)]
enum Response {
    Snapshot(PlatformSnapshot),
    Fail(String),
}

/// Serves whatever snapshot it was last given. Scriptable failures and health.
#[derive(Debug)]
pub struct FixedSource {
    platform: Platform,
    app_ids: Vec<String>,
    response: Mutex<Response>,
    healthy: AtomicBool,
    fetches: AtomicUsize,
}

impl FixedSource {
    pub fn new(snapshot: PlatformSnapshot, app_ids: Vec<String>) -> Self {
        Self {
            platform: snapshot.platform(),
            app_ids,
            response: Mutex::new(Response::Snapshot(snapshot)),
            healthy: AtomicBool::new(true),
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source whose every fetch fails with `message`.
    pub fn failing(platform: Platform, app_ids: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            platform,
            app_ids,
            response: Mutex::new(Response::Fail(message.into())),
            healthy: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }

    pub async fn set_snapshot(&self, snapshot: PlatformSnapshot) {
        *self.response.lock().await = Response::Snapshot(snapshot);
    }

    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.response.lock().await = Response::Fail(message.into());
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Number of `fetch_snapshot` calls so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformSource for FixedSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn validate_config(&self) -> Result<(), ConfigurationError> {
        validate_identifiers(self.platform, &self.app_ids)
    }

    async fn fetch_snapshot(&self) -> Result<PlatformSnapshot, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.response.lock().await.clone() {
            Response::Snapshot(mut snapshot) => {
                crate::ensure_platform(self.platform, &snapshot)?;
                snapshot.retain_apps(&self.app_ids);
                Ok(snapshot)
            }
            Response::Fail(message) => Err(FetchError::Transport {
                platform: self.platform,
                message,
            }),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}
