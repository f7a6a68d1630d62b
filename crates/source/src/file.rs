use std::path::{Path, PathBuf};

use async_trait::async_trait;
use storewatch_core::{Platform, PlatformSnapshot};

use crate::validate::validate_identifiers;
use crate::{ensure_platform, ConfigurationError, FetchError, PlatformSource};

/// Reads a normalized snapshot from a JSON file on every poll.
///
/// Whatever writes the file (an exporter, a cron job, a test) owns its
/// contents; this source only filters it to the configured identifiers.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    platform: Platform,
    app_ids: Vec<String>,
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(platform: Platform, app_ids: Vec<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            app_ids,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PlatformSource for FileSnapshotSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn validate_config(&self) -> Result<(), ConfigurationError> {
        validate_identifiers(self.platform, &self.app_ids)?;
        if !self.path.is_file() {
            return Err(ConfigurationError::InvalidLocation {
                platform: self.platform,
                location: self.path.display().to_string(),
                reason: "file does not exist".to_string(),
            });
        }
        Ok(())
    }

    async fn fetch_snapshot(&self) -> Result<PlatformSnapshot, FetchError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                platform: self.platform,
                path: self.path.clone(),
                source,
            })?;
        let mut snapshot: PlatformSnapshot =
            serde_json::from_str(&raw).map_err(|e| FetchError::Decode {
                platform: self.platform,
                message: e.to_string(),
            })?;
        ensure_platform(self.platform, &snapshot)?;
        snapshot.retain_apps(&self.app_ids);
        tracing::debug!(
            platform = %self.platform,
            path = %self.path.display(),
            apps = snapshot.app_count(),
            "snapshot read"
        );
        Ok(snapshot)
    }

    async fn health_check(&self) -> bool {
        tokio::fs::metadata(&self.path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}
