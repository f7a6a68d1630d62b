//! Detector output ([`ChangeEvent`]) and composer input ([`NotificationPayload`]).

use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{EntityKind, ObservedState, Platform, TrackedEntity};

/// Well-known keys of [`NotificationPayload::metadata`].
pub mod meta {
    pub const BUNDLE_ID: &str = "bundle_id";
    pub const PACKAGE_NAME: &str = "package_name";
    pub const VERSION: &str = "version";
    pub const BUILD_NUMBER: &str = "build_number";
    pub const APP_VERSION: &str = "app_version";
    pub const APP_STATUS: &str = "app_status";
    pub const VERSION_CODE: &str = "version_code";
    pub const VERSION_NAME: &str = "version_name";
    pub const PREVIOUS_VERSION_CODE: &str = "previous_version_code";
    pub const TRACK: &str = "track";
    pub const PREVIOUS_STATUS: &str = "previous_status";
    pub const IS_NEW: &str = "is_new";
    pub const STATUS_CHANGE: &str = "status_change";
    pub const USER_FRACTION: &str = "user_fraction";
    pub const ICON_URL: &str = "icon_url";
    pub const UPLOADED_AT: &str = "uploaded_at";
}

/// Which of the mutually exclusive outcomes an inspection produced.
///
/// `VersionChanged` only appears when the status is unchanged and the
/// record already existed; a version bump never masks `New` or `StatusChanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    New,
    StatusChanged,
    VersionChanged,
    Unchanged,
}

/// Result of comparing one entity's current state against the stored one.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub entity: TrackedEntity,
    pub current: ObservedState,
    /// No stored record existed.
    pub is_new: bool,
    /// A stored record existed with a different status.
    pub status_changed: bool,
    pub previous_status: Option<String>,
    /// The tracked version code differs from the stored one (either direction).
    pub version_changed: bool,
    pub previous_version_code: Option<u64>,
}

impl ChangeEvent {
    pub fn kind(&self) -> ChangeKind {
        if self.is_new {
            ChangeKind::New
        } else if self.status_changed {
            ChangeKind::StatusChanged
        } else if self.version_changed {
            ChangeKind::VersionChanged
        } else {
            ChangeKind::Unchanged
        }
    }

    pub fn requires_notification(&self) -> bool {
        self.kind() != ChangeKind::Unchanged
    }

    /// The backend reported a lower version code than the one last seen.
    pub fn version_regressed(&self) -> bool {
        matches!(
            (self.previous_version_code, self.current.version_code),
            (Some(prev), Some(cur)) if cur < prev
        )
    }
}

/// A rendered-but-not-formatted notification, consumed once by the composer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub platform: Platform,
    pub kind: EntityKind,
    pub app_name: String,
    pub status: String,
    /// Plain-text description of the change.
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl NotificationPayload {
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    pub fn meta_u64(&self, key: &str) -> Option<u64> {
        self.metadata.get(key).and_then(|v| v.as_u64())
    }
}
