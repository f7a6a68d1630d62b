//! Play Store candidate selection.

use std::collections::BTreeMap;

use serde_json::Value;
use storewatch_core::{
    meta, EntityKey, EntityKind, Platform, PlayStoreApp, PlayStoreRelease, TrackedEntity,
};

use crate::Candidate;

/// One candidate per track: the release carrying the highest version code.
///
/// Releases without version codes are ignored; a track left without any
/// release produces no candidate. `app_name` overrides every app's display
/// name when set.
pub fn candidates(apps: &[PlayStoreApp], app_name: Option<&str>) -> Vec<Candidate> {
    let mut out = Vec::new();
    for app in apps {
        let display_name = app_name
            .or(app.title.as_deref())
            .unwrap_or(&app.package_name)
            .to_string();

        for track in &app.tracks {
            let Some((code, release)) = latest_release(&track.releases) else {
                continue;
            };
            let version_name = release
                .name
                .clone()
                .unwrap_or_else(|| code.to_string());

            let mut metadata = BTreeMap::new();
            metadata.insert(meta::PACKAGE_NAME.into(), Value::from(app.package_name.as_str()));
            metadata.insert(meta::TRACK.into(), Value::from(track.track.as_str()));
            metadata.insert(meta::VERSION_CODE.into(), Value::from(code));
            metadata.insert(meta::VERSION_NAME.into(), Value::from(version_name.as_str()));
            if let Some(fraction) = release.user_fraction {
                metadata.insert(meta::USER_FRACTION.into(), Value::from(fraction));
            }

            out.push(Candidate {
                entity: TrackedEntity {
                    platform: Platform::PlayStore,
                    key: EntityKey::track(&app.package_name, &track.track),
                    kind: EntityKind::TrackRelease,
                    display_name: display_name.clone(),
                    metadata,
                },
                status: release.status.clone(),
                version_label: version_name,
                version_code: Some(code),
            });
        }
    }
    out
}

/// Highest version code on the track and the release that carries it.
/// The first release wins a tie.
fn latest_release(releases: &[PlayStoreRelease]) -> Option<(u64, &PlayStoreRelease)> {
    releases
        .iter()
        .filter_map(|r| r.max_version_code().map(|code| (code, r)))
        .fold(None, |best, (code, r)| match best {
            Some((best_code, _)) if best_code >= code => best,
            _ => Some((code, r)),
        })
}
