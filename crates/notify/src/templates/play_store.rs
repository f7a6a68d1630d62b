use storewatch_core::text::{play_store_status_emoji, title_case};
use storewatch_core::{meta, EntityKind, NotificationPayload, Platform};

use super::required;
use crate::colors::play_store_color;
use crate::{Attachment, ComposeError, Field, SlackMessage};

const PLAY_ICON: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/2/2f/Google_Play_2022_icon.svg/1200px-Google_Play_2022_icon.svg.png";

pub(super) fn render(payload: &NotificationPayload) -> Result<SlackMessage, ComposeError> {
    if payload.kind != EntityKind::TrackRelease {
        return Err(ComposeError::UnsupportedKind {
            platform: Platform::PlayStore,
            kind: payload.kind,
        });
    }

    let package = required(payload, meta::PACKAGE_NAME)?;
    let track = required(payload, meta::TRACK)?;
    let code = payload
        .meta_u64(meta::VERSION_CODE)
        .ok_or(ComposeError::MissingField {
            platform: payload.platform,
            kind: payload.kind,
            field: meta::VERSION_CODE,
        })?;
    let previous_code = payload.meta_u64(meta::PREVIOUS_VERSION_CODE);
    let is_new = payload
        .metadata
        .get(meta::IS_NEW)
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let app = &payload.app_name;
    let emoji = play_store_status_emoji(&payload.status);
    let status = title_case(&payload.status);

    let text = match previous_code {
        _ if is_new => {
            format!("{emoji} New release detected for *{app}* with version code *{code}*")
        }
        Some(prev) if prev != code => {
            format!("{emoji} Version code updated for *{app}*: *{prev}* → *{code}*")
        }
        _ => format!("{emoji} The status of your app *{app}* has been changed to *{status}*"),
    };

    let mut fields = vec![
        Field::short("Version Code", code.to_string()),
        Field::short("Status", status),
        Field::short("Track", title_case(track)),
    ];
    if let Some(fraction) = payload
        .metadata
        .get(meta::USER_FRACTION)
        .and_then(|v| v.as_f64())
    {
        fields.push(Field::short("Rollout", format!("{:.0}%", fraction * 100.0)));
    }

    let attachment = Attachment {
        fallback: Some(format!(
            "Google Play Console update for {app} on {track} track"
        )),
        color: Some(play_store_color(&payload.status).to_string()),
        title: Some(Platform::PlayStore.console_name().to_string()),
        title_link: Some(format!(
            "https://play.google.com/console/developers/app/{package}/tracks/{track}"
        )),
        author_name: Some(app.clone()),
        author_icon: Some(PLAY_ICON.to_string()),
        fields,
        footer_icon: Some(PLAY_ICON.to_string()),
        ..Default::default()
    };

    Ok(SlackMessage {
        text,
        channel: None,
        attachments: vec![attachment],
    })
}
