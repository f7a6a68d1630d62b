//! Tracked entities, their composite keys, and observed state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Platform;

/// Separator between key components. Components are escaped before joining,
/// so identifiers that contain it cannot produce colliding keys.
pub const KEY_DELIMITER: char = '|';

const ESCAPE: char = '%';

/// Context component of app-version keys. Emitted unescaped, and a bare `%`
/// followed by anything but `25`/`7C` never comes out of escaping, so no
/// build number or track can encode to it.
const APP_VERSION_CONTEXT: &str = "%app";

/// Composite natural key of a tracked entity within one platform namespace.
///
/// Encodes as `app_id|version|context`. Empty components are normalized to
/// `None` at construction time, which keeps [`EntityKey::encode`] injective.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub app_id: String,
    pub version: Option<String>,
    pub context: Option<String>,
    /// Set on the App Store app-version record, which has no context of its own.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub app_level: bool,
}

impl EntityKey {
    pub fn new(app_id: &str, version: Option<&str>, context: Option<&str>) -> Self {
        fn non_empty(s: Option<&str>) -> Option<String> {
            s.filter(|v| !v.is_empty()).map(str::to_string)
        }
        EntityKey {
            app_id: app_id.to_string(),
            version: non_empty(version),
            context: non_empty(context),
            app_level: false,
        }
    }

    /// Key for an uploaded App Store build.
    pub fn build(bundle_id: &str, version: &str, build_number: &str) -> Self {
        Self::new(bundle_id, Some(version), Some(build_number))
    }

    /// Key for the App Store app-version (review/release) record.
    pub fn app_version(bundle_id: &str, version_string: &str) -> Self {
        EntityKey {
            app_level: true,
            ..Self::new(bundle_id, Some(version_string), None)
        }
    }

    /// Key for a Play Store track. The tracked version code is state, not identity.
    pub fn track(package_name: &str, track: &str) -> Self {
        Self::new(package_name, None, Some(track))
    }

    /// Stable string form used as the state-store key.
    pub fn encode(&self) -> String {
        let context = if self.app_level {
            APP_VERSION_CONTEXT.to_string()
        } else {
            escape(self.context.as_deref().unwrap_or(""))
        };
        let parts = [
            escape(&self.app_id),
            escape(self.version.as_deref().unwrap_or("")),
            context,
        ];
        parts.join(&KEY_DELIMITER.to_string())
    }

    /// Inverse of [`EntityKey::encode`]. `None` for strings it never produces.
    pub fn decode(encoded: &str) -> Option<Self> {
        let parts: Vec<&str> = encoded.split(KEY_DELIMITER).collect();
        let [app_id, version, context] = parts.as_slice() else {
            return None;
        };
        let app_id = unescape(app_id)?;
        let version = unescape(version)?;
        if *context == APP_VERSION_CONTEXT {
            return Some(Self::app_version(&app_id, &version));
        }
        let context = unescape(context)?;
        Some(Self::new(&app_id, Some(&version), Some(&context)))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn escape(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for c in component.chars() {
        match c {
            ESCAPE => out.push_str("%25"),
            KEY_DELIMITER => out.push_str("%7C"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(component: &str) -> Option<String> {
    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        let code: String = chars.by_ref().take(2).collect();
        match code.as_str() {
            "25" => out.push(ESCAPE),
            "7C" => out.push(KEY_DELIMITER),
            _ => return None,
        }
    }
    Some(out)
}

/// What level of record an entity represents; selects the message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// App-level version state (review / release status).
    AppVersion,
    /// An uploaded binary with its own processing status.
    Build,
    /// The latest release on a rollout track.
    TrackRelease,
}

/// One thing being watched, as observed in a single cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedEntity {
    pub platform: Platform,
    pub key: EntityKey,
    pub kind: EntityKind,
    /// Human-facing app name.
    pub display_name: String,
    /// Extra fields carried through to the notification payload.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// The fields whose change matters, plus when they were last checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedState {
    pub status: String,
    pub version_label: String,
    /// Ordinal version identifier for version-sequence entities.
    #[serde(default)]
    pub version_code: Option<u64>,
    /// RFC 3339 timestamp of the inspection that produced this state.
    pub last_checked_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_all_three_components() {
        let key = EntityKey::build("com.example.app", "1.2.0", "45");
        assert_eq!(key.encode(), "com.example.app|1.2.0|45");
    }

    #[test]
    fn absent_components_encode_empty() {
        let key = EntityKey::track("com.example.app", "beta");
        assert_eq!(key.encode(), "com.example.app||beta");
    }

    #[test]
    fn delimiter_inside_identifier_does_not_collide() {
        // Without escaping both would encode to "a|b|c|".
        let left = EntityKey::new("a|b", Some("c"), None);
        let right = EntityKey::new("a", Some("b|c"), None);
        assert_ne!(left.encode(), right.encode());
        assert_eq!(EntityKey::decode(&left.encode()), Some(left));
        assert_eq!(EntityKey::decode(&right.encode()), Some(right));
    }

    #[test]
    fn hyphenated_identifiers_stay_distinct() {
        // The dash-joined scheme made these two keys identical.
        let left = EntityKey::build("com.acme-beta", "1", "2");
        let right = EntityKey::build("com.acme", "beta-1", "2");
        assert_ne!(left.encode(), right.encode());
    }

    #[test]
    fn escape_character_round_trips() {
        let key = EntityKey::new("100%|pure", Some("%7C"), Some("x"));
        assert_eq!(EntityKey::decode(&key.encode()), Some(key));
    }

    #[test]
    fn decode_rejects_foreign_strings() {
        assert_eq!(EntityKey::decode("no-delimiters"), None);
        assert_eq!(EntityKey::decode("a|b|c|d"), None);
        assert_eq!(EntityKey::decode("a%zz|b|c"), None);
    }

    #[test]
    fn app_version_key_never_matches_a_build_key() {
        let version = EntityKey::app_version("com.example.app", "2.0");
        for build_number in ["app", "%app", ""] {
            let build = EntityKey::build("com.example.app", "2.0", build_number);
            assert_ne!(version, build);
            assert_ne!(version.encode(), build.encode(), "build {build_number:?}");
        }
        assert_eq!(version.encode(), "com.example.app|2.0|%app");
        assert_eq!(EntityKey::decode(&version.encode()), Some(version));
    }

    #[test]
    fn empty_components_normalize_to_none() {
        let key = EntityKey::new("app", Some(""), Some(""));
        assert_eq!(key.version, None);
        assert_eq!(key.context, None);
    }
}
