//! Per-platform single-notification templates.
//!
//! Templates never set `footer` or `ts`; the composer stamps both.

mod app_store;
mod play_store;

use storewatch_core::{NotificationPayload, Platform};

use crate::{ComposeError, SlackMessage};

pub(crate) fn render(payload: &NotificationPayload) -> Result<SlackMessage, ComposeError> {
    match payload.platform {
        Platform::AppStore => app_store::render(payload),
        Platform::PlayStore => play_store::render(payload),
    }
}

/// Required string metadata, or a [`ComposeError::MissingField`].
fn required<'a>(
    payload: &'a NotificationPayload,
    field: &'static str,
) -> Result<&'a str, ComposeError> {
    payload
        .meta_str(field)
        .filter(|s| !s.is_empty())
        .ok_or(ComposeError::MissingField {
            platform: payload.platform,
            kind: payload.kind,
            field,
        })
}
