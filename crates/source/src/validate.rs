//! Identifier checks shared by every source.

use std::sync::OnceLock;

use regex::Regex;
use storewatch_core::Platform;

use crate::ConfigurationError;

/// Android application id: two or more dot-separated segments, each starting
/// with a letter.
pub const PACKAGE_NAME_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9_]*(\.[a-zA-Z][a-zA-Z0-9_]*)+$";

fn package_name_regex() -> Result<&'static Regex, ConfigurationError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(PACKAGE_NAME_PATTERN))
        .as_ref()
        .map_err(|e| ConfigurationError::Invalid {
            name: "package name pattern".to_string(),
            value: PACKAGE_NAME_PATTERN.to_string(),
            reason: e.to_string(),
        })
}

pub fn is_valid_package_name(name: &str) -> bool {
    package_name_regex().is_ok_and(|re| re.is_match(name))
}

/// Validate the identifier list configured for `platform`.
///
/// App Store bundle ids must be non-blank and free of whitespace; Play Store
/// package names must match [`PACKAGE_NAME_PATTERN`]. Duplicates are rejected
/// on both platforms.
pub fn validate_identifiers(platform: Platform, ids: &[String]) -> Result<(), ConfigurationError> {
    if ids.is_empty() {
        return Err(ConfigurationError::NoIdentifiers { platform });
    }

    let invalid = |identifier: &str, reason: &str| ConfigurationError::InvalidIdentifier {
        platform,
        identifier: identifier.to_string(),
        reason: reason.to_string(),
    };

    for (idx, id) in ids.iter().enumerate() {
        if id.trim().is_empty() {
            return Err(invalid(id, "identifier is blank"));
        }
        if ids[..idx].contains(id) {
            return Err(invalid(id, "listed more than once"));
        }
        match platform {
            Platform::AppStore => {
                if id.chars().any(char::is_whitespace) {
                    return Err(invalid(id, "bundle identifier contains whitespace"));
                }
            }
            Platform::PlayStore => {
                let re = package_name_regex()?;
                if !re.is_match(id) {
                    return Err(invalid(id, "not a valid package name"));
                }
            }
        }
    }
    Ok(())
}

/// Split a comma-separated list, trimming blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn package_names() {
        assert!(is_valid_package_name("com.example.app"));
        assert!(is_valid_package_name("com.example_co.app2"));
        assert!(!is_valid_package_name("example"));
        assert!(!is_valid_package_name("com.1example"));
        assert!(!is_valid_package_name("com..example"));
        assert!(!is_valid_package_name("com.example|beta"));
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = validate_identifiers(Platform::PlayStore, &[]).unwrap_err();
        assert!(matches!(err, ConfigurationError::NoIdentifiers { .. }));
    }

    #[test]
    fn bad_package_name_names_the_culprit() {
        let err =
            validate_identifiers(Platform::PlayStore, &ids(&["com.ok.app", "nope"])).unwrap_err();
        match err {
            ConfigurationError::InvalidIdentifier { identifier, .. } => {
                assert_eq!(identifier, "nope")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bundle_ids_are_not_held_to_package_rules() {
        validate_identifiers(Platform::AppStore, &ids(&["com.example.App-Beta", "single"]))
            .unwrap();
        assert!(validate_identifiers(Platform::AppStore, &ids(&["has space"])).is_err());
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = validate_identifiers(Platform::AppStore, &ids(&["a.b", "a.b"])).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn split_list_trims_and_drops_blanks() {
        assert_eq!(split_list(" a.b , ,c.d,"), ids(&["a.b", "c.d"]));
        assert!(split_list("").is_empty());
    }
}
