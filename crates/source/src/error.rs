use std::path::PathBuf;

use storewatch_core::Platform;

/// Missing or invalid configuration. Fatal at startup, never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("missing required setting {name}")]
    Missing { name: String },

    #[error("invalid value for {name} ({value:?}): {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },

    #[error("no identifiers configured for {platform}")]
    NoIdentifiers { platform: Platform },

    #[error("invalid {platform} identifier {identifier:?}: {reason}")]
    InvalidIdentifier {
        platform: Platform,
        identifier: String,
        reason: String,
    },

    #[error("invalid snapshot location for {platform} ({location}): {reason}")]
    InvalidLocation {
        platform: Platform,
        location: String,
        reason: String,
    },
}

/// A backend call failed. Aborts the current cycle only.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{platform} fetch failed: {message}")]
    Transport { platform: Platform, message: String },

    #[error("{platform} backend returned HTTP {code}")]
    Status { platform: Platform, code: u16 },

    #[error("{platform} snapshot could not be decoded: {message}")]
    Decode { platform: Platform, message: String },

    #[error("{platform} snapshot file {path} unreadable: {source}")]
    Io {
        platform: Platform,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("expected a {expected} snapshot, got {found}")]
    PlatformMismatch { expected: Platform, found: Platform },
}
