//! Change detection: diff a fresh snapshot against last-known state.
//!
//! [`ChangeDetector`] owns the decision of whether an observation is worth a
//! notification. Per-platform modules only choose *which* records to inspect:
//!
//! - [`app_store`] -- newest builds per app plus the app-version state
//! - [`play_store`] -- the highest-version-code release per track
//!
//! The shared engine then compares each candidate with its stored record,
//! overwrites that record, and reports the outcome as a
//! [`ChangeEvent`](storewatch_core::ChangeEvent). [`payload`] renders
//! notification-worthy events into
//! [`NotificationPayload`](storewatch_core::NotificationPayload)s.

pub mod app_store;
mod detector;
pub mod payload;
pub mod play_store;

pub use detector::{
    Candidate, ChangeDetector, Detection, DetectorOptions, InspectionFailure, Processed,
    DEFAULT_NUMBER_OF_BUILDS,
};
pub use payload::build_payload;
