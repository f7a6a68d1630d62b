//! storewatch-core: shared types for the storewatch release notifier.
//!
//! Everything that crosses a crate boundary lives here:
//!
//! - [`Platform`] -- the backend tag, also used as the state-store namespace
//! - [`EntityKey`], [`TrackedEntity`], [`ObservedState`] -- what is watched and
//!   what was seen
//! - [`ChangeEvent`], [`NotificationPayload`] -- detector output and composer input
//! - [`PlatformSnapshot`] -- the normalized result of one fetch
//! - [`text`] -- pure formatting helpers (title casing, status emoji tables)

pub mod entity;
pub mod event;
pub mod platform;
pub mod snapshot;
pub mod text;
pub mod timestamp;

pub use entity::{EntityKey, EntityKind, ObservedState, TrackedEntity, KEY_DELIMITER};
pub use event::{meta, ChangeEvent, ChangeKind, NotificationPayload};
pub use platform::{Platform, UnknownPlatform};
pub use snapshot::{
    AppStoreApp, AppStoreBuild, AppVersionState, PlatformSnapshot, PlayStoreApp,
    PlayStoreRelease, PlayStoreTrack,
};
