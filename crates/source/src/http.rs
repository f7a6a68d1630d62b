//! HTTP snapshot bridge.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` so a slow
//! backend never blocks the runtime. The bridge is expected to answer
//! `GET <url>` with the same JSON a [`FileSnapshotSource`](crate::FileSnapshotSource) reads.

use async_trait::async_trait;
use storewatch_core::{Platform, PlatformSnapshot};
use ureq::http::Uri;

use crate::validate::validate_identifiers;
use crate::{ensure_platform, ConfigurationError, FetchError, PlatformSource};

#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    platform: Platform,
    app_ids: Vec<String>,
    url: String,
    bearer_token: Option<String>,
}

impl HttpSnapshotSource {
    pub fn new(platform: Platform, app_ids: Vec<String>, url: impl Into<String>) -> Self {
        Self {
            platform,
            app_ids,
            url: url.into(),
            bearer_token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Require an absolute http(s) URI with a host.
pub(crate) fn check_http_uri(raw: &str) -> Result<Uri, String> {
    let uri: Uri = raw.parse().map_err(|e: ureq::http::uri::InvalidUri| e.to_string())?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        Some(other) => return Err(format!("unsupported scheme {other:?}")),
        None => return Err("missing scheme".to_string()),
    }
    if uri.host().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(uri)
}

#[async_trait]
impl PlatformSource for HttpSnapshotSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn validate_config(&self) -> Result<(), ConfigurationError> {
        validate_identifiers(self.platform, &self.app_ids)?;
        check_http_uri(&self.url).map_err(|reason| ConfigurationError::InvalidLocation {
            platform: self.platform,
            location: self.url.clone(),
            reason,
        })?;
        Ok(())
    }

    async fn fetch_snapshot(&self) -> Result<PlatformSnapshot, FetchError> {
        let platform = self.platform;
        let url = self.url.clone();
        let token = self.bearer_token.clone();

        let result = tokio::task::spawn_blocking(move || {
            let agent = ureq::Agent::new_with_defaults();
            let mut request = agent.get(&url);
            if let Some(ref token) = token {
                request = request.header("Authorization", &format!("Bearer {}", token));
            }

            let response = request.call().map_err(|e| match e {
                ureq::Error::StatusCode(code) => FetchError::Status { platform, code },
                other => FetchError::Transport {
                    platform,
                    message: other.to_string(),
                },
            })?;

            response
                .into_body()
                .read_json::<PlatformSnapshot>()
                .map_err(|e| FetchError::Decode {
                    platform,
                    message: e.to_string(),
                })
        })
        .await
        .map_err(|e| FetchError::Transport {
            platform,
            message: format!("task join error: {}", e),
        })?;

        let mut snapshot = result?;
        ensure_platform(platform, &snapshot)?;
        snapshot.retain_apps(&self.app_ids);
        tracing::debug!(platform = %platform, apps = snapshot.app_count(), "snapshot fetched");
        Ok(snapshot)
    }

    async fn health_check(&self) -> bool {
        match self.fetch_snapshot().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(platform = %self.platform, error = %e, "health check failed");
                false
            }
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
