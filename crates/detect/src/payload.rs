//! Plain-text rendering of change events into notification payloads.

use serde_json::Value;
use storewatch_core::text::title_case;
use storewatch_core::{meta, ChangeEvent, ChangeKind, EntityKind, NotificationPayload};
use time::OffsetDateTime;

/// Render `event` into the payload handed to the composer.
///
/// Metadata is the entity's own metadata plus the change flags
/// (`is_new`, `status_change`, `previous_status`, `previous_version_code`).
pub fn build_payload(event: &ChangeEvent, timestamp: OffsetDateTime) -> NotificationPayload {
    let mut metadata = event.entity.metadata.clone();
    metadata.insert(meta::IS_NEW.into(), Value::Bool(event.is_new));
    metadata.insert(meta::STATUS_CHANGE.into(), Value::Bool(event.status_changed));
    if let Some(prev) = &event.previous_status {
        metadata.insert(meta::PREVIOUS_STATUS.into(), Value::from(prev.as_str()));
    }
    if let Some(prev) = event.previous_version_code {
        metadata.insert(meta::PREVIOUS_VERSION_CODE.into(), Value::from(prev));
    }

    NotificationPayload {
        platform: event.entity.platform,
        kind: event.entity.kind,
        app_name: event.entity.display_name.clone(),
        status: event.current.status.clone(),
        message: message(event),
        timestamp,
        metadata,
    }
}

fn meta_str<'a>(event: &'a ChangeEvent, key: &str) -> &'a str {
    event
        .entity
        .metadata
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
}

fn message(event: &ChangeEvent) -> String {
    let app = &event.entity.display_name;
    let status = title_case(&event.current.status);
    let previous = title_case(event.previous_status.as_deref().unwrap_or(""));
    let kind = event.kind();

    match event.entity.kind {
        EntityKind::Build => {
            let version = meta_str(event, meta::VERSION);
            let build = meta_str(event, meta::BUILD_NUMBER);
            match kind {
                ChangeKind::New => {
                    format!("New build {version} ({build}) for {app} is now {status}")
                }
                ChangeKind::StatusChanged => format!(
                    "Build {version} ({build}) for {app} changed from {previous} to {status}"
                ),
                _ => format!("Build {version} ({build}) for {app} status: {status}"),
            }
        }
        EntityKind::AppVersion => {
            let version = &event.current.version_label;
            match kind {
                ChangeKind::New => format!("App version {version} for {app} is now {status}"),
                ChangeKind::StatusChanged => format!(
                    "App version {version} for {app} changed from {previous} to {status}"
                ),
                _ => format!("App version {version} for {app} status: {status}"),
            }
        }
        EntityKind::TrackRelease => {
            let track = title_case(meta_str(event, meta::TRACK));
            let info = version_info(event);
            match kind {
                ChangeKind::New => format!("New {info} for {app} is now {status} in {track}"),
                ChangeKind::StatusChanged => format!(
                    "{info} for {app} in {track} changed from {previous} to {status}"
                ),
                ChangeKind::VersionChanged if event.version_regressed() => format!(
                    "{info} for {app} in {track} rolled back from version {} ({status})",
                    event.previous_version_code.unwrap_or_default()
                ),
                ChangeKind::VersionChanged => format!(
                    "New {info} for {app} is now {status} in {track} (was version {})",
                    event.previous_version_code.unwrap_or_default()
                ),
                ChangeKind::Unchanged => {
                    format!("{info} for {app} in {track} status: {status}")
                }
            }
        }
    }
}

/// `3.1 (12)` when the release has a name distinct from its code, else `version 12`.
fn version_info(event: &ChangeEvent) -> String {
    let code = event.current.version_code.unwrap_or_default();
    let name = &event.current.version_label;
    if name.is_empty() || *name == code.to_string() {
        format!("version {code}")
    } else {
        format!("{name} ({code})")
    }
}
