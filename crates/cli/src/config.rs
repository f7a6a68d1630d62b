//! Environment-driven configuration, read once at startup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use storewatch_core::Platform;
use storewatch_detect::DEFAULT_NUMBER_OF_BUILDS;
use storewatch_source::validate::split_list;
use storewatch_source::{ConfigurationError, FileSnapshotSource, HttpSnapshotSource, PlatformSource};

pub const DEFAULT_POLL_SECONDS: u64 = 90;
pub const DEFAULT_STATE_FILE: &str = "kvstore.db";

/// Where a platform's normalized snapshot comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotLocation {
    Url {
        url: String,
        bearer_token: Option<String>,
    },
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    pub platform: Platform,
    pub app_ids: Vec<String>,
    pub location: SnapshotLocation,
}

impl PlatformConfig {
    pub fn build_source(&self) -> Arc<dyn PlatformSource> {
        match &self.location {
            SnapshotLocation::Url { url, bearer_token } => {
                let mut source =
                    HttpSnapshotSource::new(self.platform, self.app_ids.clone(), url.clone());
                if let Some(token) = bearer_token {
                    source = source.with_bearer_token(token.clone());
                }
                Arc::new(source)
            }
            SnapshotLocation::File(path) => Arc::new(FileSnapshotSource::new(
                self.platform,
                self.app_ids.clone(),
                path.clone(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub slack_webhook_url: Option<String>,
    pub slack_channel: Option<String>,
    pub poll_interval: Duration,
    /// Display name override for Play Store notifications.
    pub app_name: Option<String>,
    pub number_of_builds: usize,
    pub state_file: PathBuf,
    pub platforms: Vec<PlatformConfig>,
}

/// Per-platform environment variable names.
struct PlatformVars {
    platform: Platform,
    ids: &'static str,
    url: &'static str,
    file: &'static str,
    token: &'static str,
}

const PLATFORM_VARS: [PlatformVars; 2] = [
    PlatformVars {
        platform: Platform::AppStore,
        ids: "BUNDLE_IDENTIFIERS",
        url: "APP_STORE_SNAPSHOT_URL",
        file: "APP_STORE_SNAPSHOT_FILE",
        token: "APP_STORE_SNAPSHOT_TOKEN",
    },
    PlatformVars {
        platform: Platform::PlayStore,
        ids: "GOOGLE_PLAY_PACKAGE_NAMES",
        url: "PLAY_STORE_SNAPSHOT_URL",
        file: "PLAY_STORE_SNAPSHOT_FILE",
        token: "PLAY_STORE_SNAPSHOT_TOKEN",
    },
];

impl Config {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any name → value lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let poll_seconds = parse_positive(&get, "POLL_TIME_IN_SECONDS", DEFAULT_POLL_SECONDS)?;
        let number_of_builds =
            parse_positive(&get, "NUMBER_OF_BUILDS", DEFAULT_NUMBER_OF_BUILDS as u64)?;

        let mut platforms = Vec::new();
        for vars in &PLATFORM_VARS {
            let Some(raw_ids) = get(vars.ids) else {
                continue;
            };
            let location = match (get(vars.url), get(vars.file)) {
                (Some(url), None) => SnapshotLocation::Url {
                    url,
                    bearer_token: get(vars.token),
                },
                (None, Some(file)) => SnapshotLocation::File(PathBuf::from(file)),
                (Some(_), Some(_)) => {
                    return Err(ConfigurationError::Invalid {
                        name: vars.url.to_string(),
                        value: "(set together with the file variant)".to_string(),
                        reason: format!("set only one of {} and {}", vars.url, vars.file),
                    })
                }
                (None, None) => {
                    return Err(ConfigurationError::Missing {
                        name: format!("{} or {}", vars.url, vars.file),
                    })
                }
            };
            platforms.push(PlatformConfig {
                platform: vars.platform,
                app_ids: split_list(&raw_ids),
                location,
            });
        }
        if platforms.is_empty() {
            return Err(ConfigurationError::Missing {
                name: "BUNDLE_IDENTIFIERS or GOOGLE_PLAY_PACKAGE_NAMES".to_string(),
            });
        }

        Ok(Self {
            slack_webhook_url: get("SLACK_WEBHOOK_URL"),
            slack_channel: get("SLACK_CHANNEL_NAME"),
            poll_interval: Duration::from_secs(poll_seconds),
            app_name: get("NOTIFIER_APP_NAME"),
            number_of_builds: usize::try_from(number_of_builds).unwrap_or(usize::MAX),
            state_file: get("STOREWATCH_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            platforms,
        })
    }

    pub fn enabled_platforms(&self) -> Vec<Platform> {
        self.platforms.iter().map(|p| p.platform).collect()
    }
}

fn parse_positive<G>(get: &G, name: &str, default: u64) -> Result<u64, ConfigurationError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(name) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigurationError::Invalid {
            name: name.to_string(),
            value: raw,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigurationError::Invalid {
            name: name.to_string(),
            value: raw,
            reason: e.to_string(),
        }),
    }
}
