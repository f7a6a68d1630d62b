//! RFC 3339 timestamp helpers.
//!
//! Persisted records carry timestamps as RFC 3339 strings so the on-disk
//! format stays readable and independent of the `time` crate's serde layout.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Format an instant as RFC 3339 (UTC offset preserved).
pub fn rfc3339(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| "unknown".to_string())
}

/// Current UTC time as RFC 3339.
pub fn now_rfc3339() -> String {
    rfc3339(OffsetDateTime::now_utc())
}

/// Parse an RFC 3339 string; `None` when malformed.
pub fn parse_rfc3339(s: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(s, &Rfc3339).ok()
}
