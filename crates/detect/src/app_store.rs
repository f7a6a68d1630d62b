//! App Store candidate selection.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use storewatch_core::{meta, AppStoreApp, AppStoreBuild, EntityKey, EntityKind, Platform, TrackedEntity};

use crate::Candidate;

/// Candidates for every app: its newest `number_of_builds` builds (by upload
/// time, newest first) followed by its app-version state when present.
///
/// An app listed more than once is treated as one app: its builds are pooled
/// before the limit applies and the first listed version state wins. Builds
/// sharing a key keep only the most recent upload. Builds with an unparseable
/// upload time sort after every dated build.
pub fn candidates(apps: &[AppStoreApp], number_of_builds: usize) -> Vec<Candidate> {
    let mut out = Vec::new();
    for app in &merge_listings(apps) {
        for build in newest_builds(&app.builds, number_of_builds) {
            out.push(build_candidate(app, build));
        }
        if let Some(state) = &app.version_state {
            let mut metadata = base_metadata(app);
            metadata.insert(meta::APP_VERSION.into(), Value::from(state.version_string.as_str()));
            metadata.insert(meta::APP_STATUS.into(), Value::from(state.status.as_str()));
            out.push(Candidate {
                entity: TrackedEntity {
                    platform: Platform::AppStore,
                    key: EntityKey::app_version(&app.bundle_id, &state.version_string),
                    kind: EntityKind::AppVersion,
                    display_name: app.name.clone(),
                    metadata,
                },
                status: state.status.clone(),
                version_label: state.version_string.clone(),
                version_code: None,
            });
        }
    }
    out
}

fn merge_listings(apps: &[AppStoreApp]) -> Vec<AppStoreApp> {
    let mut merged: Vec<AppStoreApp> = Vec::with_capacity(apps.len());
    for app in apps {
        match merged.iter_mut().find(|m| m.bundle_id == app.bundle_id) {
            Some(existing) => {
                existing.builds.extend(app.builds.iter().cloned());
                if existing.version_state.is_none() {
                    existing.version_state = app.version_state.clone();
                }
            }
            None => merged.push(app.clone()),
        }
    }
    merged
}

fn newest_builds(builds: &[AppStoreBuild], limit: usize) -> Vec<&AppStoreBuild> {
    let mut sorted: Vec<&AppStoreBuild> = builds.iter().collect();
    // Stable sort: equal timestamps keep snapshot order.
    sorted.sort_by(|a, b| b.uploaded_at().cmp(&a.uploaded_at()));

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|&b| seen.insert((b.version.as_str(), b.build_number.as_str())))
        .take(limit)
        .collect()
}

fn base_metadata(app: &AppStoreApp) -> BTreeMap<String, Value> {
    let mut metadata = BTreeMap::new();
    metadata.insert(meta::BUNDLE_ID.into(), Value::from(app.bundle_id.as_str()));
    if let Some(icon) = &app.icon_url {
        metadata.insert(meta::ICON_URL.into(), Value::from(icon.as_str()));
    }
    metadata
}

fn build_candidate(app: &AppStoreApp, build: &AppStoreBuild) -> Candidate {
    let mut metadata = base_metadata(app);
    metadata.insert(meta::VERSION.into(), Value::from(build.version.as_str()));
    metadata.insert(meta::BUILD_NUMBER.into(), Value::from(build.build_number.as_str()));
    metadata.insert(meta::UPLOADED_AT.into(), Value::from(build.uploaded_at.as_str()));
    if let Some(state) = &app.version_state {
        metadata.insert(meta::APP_VERSION.into(), Value::from(state.version_string.as_str()));
        metadata.insert(meta::APP_STATUS.into(), Value::from(state.status.as_str()));
    }

    Candidate {
        entity: TrackedEntity {
            platform: Platform::AppStore,
            key: EntityKey::build(&app.bundle_id, &build.version, &build.build_number),
            kind: EntityKind::Build,
            display_name: app.name.clone(),
            metadata,
        },
        status: build.status.clone(),
        version_label: build.version.clone(),
        version_code: None,
    }
}
