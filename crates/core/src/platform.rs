//! The set of release backends storewatch knows how to watch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A release-management backend.
///
/// The kebab-case tag (`"app-store"`, `"play-store"`) doubles as the
/// state-store namespace, so it must never change for an existing platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    AppStore,
    PlayStore,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::AppStore, Platform::PlayStore];

    /// Stable tag used for namespacing and wire formats.
    pub fn tag(self) -> &'static str {
        match self {
            Platform::AppStore => "app-store",
            Platform::PlayStore => "play-store",
        }
    }

    /// Upper-case label used in message footers, e.g. `APP STORE`.
    pub fn label(self) -> &'static str {
        match self {
            Platform::AppStore => "APP STORE",
            Platform::PlayStore => "PLAY STORE",
        }
    }

    /// Console name shown as the attachment title.
    pub fn console_name(self) -> &'static str {
        match self {
            Platform::AppStore => "App Store Connect",
            Platform::PlayStore => "Google Play Console",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when parsing a tag that names no known platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown platform '{}'", self.0)
    }
}

impl std::error::Error for UnknownPlatform {}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.tag() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}
