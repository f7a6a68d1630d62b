//! Pure text helpers: title casing and status → emoji lookup.

use crate::Platform;

/// `READY_FOR_SALE` → `Ready For Sale`, `inProgress` → `In Progress`.
///
/// Underscores and whitespace separate words, as does a lower→upper case
/// boundary inside a word.
pub fn title_case(s: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for chunk in s.split(|c: char| c == '_' || c.is_whitespace()) {
        let mut current = String::new();
        let mut prev_lower = false;
        for c in chunk.chars() {
            if c.is_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = c.is_lowercase();
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }

    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-case with spaces folded to underscores, so `In Review` and
/// `IN_REVIEW` hit the same table row.
fn normalize(status: &str) -> String {
    status.trim().to_lowercase().replace(' ', "_")
}

pub fn app_store_status_emoji(status: &str) -> &'static str {
    match normalize(status).as_str() {
        "ready_for_sale" => "🎉",
        "in_review" | "waiting_for_review" => "🚀",
        "processing" => "⚙️",
        "pending_developer_release" => "⏳",
        "rejected" | "invalid_binary" | "metadata_rejected" | "developer_rejected" => "❌",
        "draft" | "prepare_for_submission" => "📝",
        _ => "📱",
    }
}

pub fn play_store_status_emoji(status: &str) -> &'static str {
    match normalize(status).as_str() {
        "completed" => "🎉",
        "in_progress" | "inprogress" => "🚀",
        "draft" => "📝",
        "halted" => "⏸️",
        "rolled_back" | "rolledback" => "🔄",
        "status_unspecified" | "statusunspecified" => "❓",
        _ => "📱",
    }
}

pub fn status_emoji(platform: Platform, status: &str) -> &'static str {
    match platform {
        Platform::AppStore => app_store_status_emoji(status),
        Platform::PlayStore => play_store_status_emoji(status),
    }
}
