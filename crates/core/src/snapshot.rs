//! Normalized snapshot records returned by a platform source.
//!
//! These are the shapes a source hands to the detector after translating
//! whatever the vendor API returned. They deserialize from JSON so a source
//! can read them from a file or an HTTP bridge unchanged.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::timestamp::parse_rfc3339;
use crate::Platform;

/// Everything observable on one platform in one fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "kebab-case")]
pub enum PlatformSnapshot {
    AppStore { apps: Vec<AppStoreApp> },
    PlayStore { apps: Vec<PlayStoreApp> },
}

impl PlatformSnapshot {
    pub fn platform(&self) -> Platform {
        match self {
            PlatformSnapshot::AppStore { .. } => Platform::AppStore,
            PlatformSnapshot::PlayStore { .. } => Platform::PlayStore,
        }
    }

    pub fn app_count(&self) -> usize {
        match self {
            PlatformSnapshot::AppStore { apps } => apps.len(),
            PlatformSnapshot::PlayStore { apps } => apps.len(),
        }
    }

    /// Drop apps whose identifier is not in `wanted`. An empty list keeps everything.
    pub fn retain_apps(&mut self, wanted: &[String]) {
        if wanted.is_empty() {
            return;
        }
        let keep = |id: &str| wanted.iter().any(|w| w == id);
        match self {
            PlatformSnapshot::AppStore { apps } => apps.retain(|a| keep(&a.bundle_id)),
            PlatformSnapshot::PlayStore { apps } => apps.retain(|a| keep(&a.package_name)),
        }
    }
}

// ──────────────────────────────────────────────
// App Store
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppStoreApp {
    pub bundle_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub builds: Vec<AppStoreBuild>,
    /// Review/release state of the app version being prepared or live.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_state: Option<AppVersionState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppStoreBuild {
    pub version: String,
    pub build_number: String,
    pub status: String,
    /// RFC 3339 upload time.
    pub uploaded_at: String,
}

impl AppStoreBuild {
    /// Parsed upload time; `None` sorts before every real timestamp.
    pub fn uploaded_at(&self) -> Option<OffsetDateTime> {
        parse_rfc3339(&self.uploaded_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppVersionState {
    pub version_string: String,
    pub status: String,
}

// ──────────────────────────────────────────────
// Play Store
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayStoreApp {
    pub package_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub tracks: Vec<PlayStoreTrack>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayStoreTrack {
    pub track: String,
    #[serde(default)]
    pub releases: Vec<PlayStoreRelease>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayStoreRelease {
    #[serde(default)]
    pub version_codes: Vec<u64>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_fraction: Option<f64>,
}

impl PlayStoreRelease {
    pub fn max_version_code(&self) -> Option<u64> {
        self.version_codes.iter().copied().max()
    }
}
