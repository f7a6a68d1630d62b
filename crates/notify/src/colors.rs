//! Fixed status → color tables.

use storewatch_core::Platform;

pub const NEUTRAL: &str = "#8e8e8e";
pub const WARNING: &str = "#f4f124";
pub const IN_FLIGHT: &str = "#1eb6fc";
pub const SUCCESS: &str = "#14ba40";
pub const FAILURE: &str = "#e0143d";

pub const APP_STORE_BRAND: &str = "#007AFF";
pub const PLAY_STORE_BRAND: &str = "#34A853";

/// App Store Connect app and build states. Matched case-insensitively,
/// spaces treated as underscores.
pub fn app_store_color(status: &str) -> &'static str {
    match status.trim().to_uppercase().replace(' ', "_").as_str() {
        "PREPARE_FOR_SUBMISSION" | "PROCESSING" => NEUTRAL,
        "WAITING_FOR_REVIEW" | "IN_REVIEW" => IN_FLIGHT,
        "PENDING_CONTRACT" | "WAITING_FOR_EXPORT_COMPLIANCE" => WARNING,
        "PENDING_DEVELOPER_RELEASE"
        | "PROCESSING_FOR_APP_STORE"
        | "PENDING_APPLE_RELEASE"
        | "READY_FOR_SALE"
        | "VALID" => SUCCESS,
        "REJECTED"
        | "METADATA_REJECTED"
        | "REMOVED_FROM_SALE"
        | "DEVELOPER_REJECTED"
        | "DEVELOPER_REMOVED_FROM_SALE"
        | "INVALID_BINARY"
        | "FAILED"
        | "INVALID" => FAILURE,
        _ => NEUTRAL,
    }
}

/// Play Console release states (`inProgress`, `IN_PROGRESS` and
/// `in progress` are the same row).
pub fn play_store_color(status: &str) -> &'static str {
    let folded: String = status
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    match folded.as_str() {
        "inprogress" => IN_FLIGHT,
        "halted" => FAILURE,
        "completed" => SUCCESS,
        _ => NEUTRAL,
    }
}

pub fn status_color(platform: Platform, status: &str) -> &'static str {
    match platform {
        Platform::AppStore => app_store_color(status),
        Platform::PlayStore => play_store_color(status),
    }
}

pub fn platform_color(platform: Platform) -> &'static str {
    match platform {
        Platform::AppStore => APP_STORE_BRAND,
        Platform::PlayStore => PLAY_STORE_BRAND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_store_rows() {
        assert_eq!(app_store_color("READY_FOR_SALE"), SUCCESS);
        assert_eq!(app_store_color("in review"), IN_FLIGHT);
        assert_eq!(app_store_color("INVALID_BINARY"), FAILURE);
        assert_eq!(app_store_color("PENDING_CONTRACT"), WARNING);
    }

    #[test]
    fn play_store_rows_ignore_spelling() {
        assert_eq!(play_store_color("inProgress"), IN_FLIGHT);
        assert_eq!(play_store_color("IN_PROGRESS"), IN_FLIGHT);
        assert_eq!(play_store_color("completed"), SUCCESS);
        assert_eq!(play_store_color("halted"), FAILURE);
    }

    #[test]
    fn unmapped_statuses_are_neutral() {
        assert_eq!(status_color(Platform::AppStore, "SOMETHING_NEW"), NEUTRAL);
        assert_eq!(status_color(Platform::PlayStore, ""), NEUTRAL);
    }
}
