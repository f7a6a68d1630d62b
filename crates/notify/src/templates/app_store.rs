use storewatch_core::text::title_case;
use storewatch_core::{meta, EntityKind, NotificationPayload, Platform};

use super::required;
use crate::colors::app_store_color;
use crate::{Attachment, ComposeError, Field, SlackMessage};

const FOOTER_ICON: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/c/cf/Mac_App_Store_logo.png/500px-Mac_App_Store_logo.png";

pub(super) fn render(payload: &NotificationPayload) -> Result<SlackMessage, ComposeError> {
    match payload.kind {
        EntityKind::AppVersion => app_message(payload),
        EntityKind::Build => build_message(payload),
        kind => Err(ComposeError::UnsupportedKind {
            platform: Platform::AppStore,
            kind,
        }),
    }
}

fn console_link(bundle_id: &str) -> String {
    format!("https://appstoreconnect.apple.com/apps/{bundle_id}/appstore")
}

fn base_attachment(payload: &NotificationPayload, bundle_id: &str) -> Attachment {
    Attachment {
        color: Some(app_store_color(&payload.status).to_string()),
        title: Some(Platform::AppStore.console_name().to_string()),
        title_link: Some(console_link(bundle_id)),
        author_name: Some(payload.app_name.clone()),
        author_icon: payload.meta_str(meta::ICON_URL).map(str::to_string),
        footer_icon: Some(FOOTER_ICON.to_string()),
        ..Default::default()
    }
}

fn app_message(payload: &NotificationPayload) -> Result<SlackMessage, ComposeError> {
    let bundle_id = required(payload, meta::BUNDLE_ID)?;
    let version = required(payload, meta::APP_VERSION)?;
    let app = &payload.app_name;
    let status = title_case(&payload.status);

    let attachment = Attachment {
        fallback: Some(format!(
            "The status of your app {app} has been changed to {status}"
        )),
        fields: vec![
            Field::short("Version", version),
            Field::short("Status", status.clone()),
        ],
        ..base_attachment(payload, bundle_id)
    };

    Ok(SlackMessage {
        text: format!("The status of your app *{app}* has been changed to *{status}*"),
        channel: None,
        attachments: vec![attachment],
    })
}

fn build_message(payload: &NotificationPayload) -> Result<SlackMessage, ComposeError> {
    let bundle_id = required(payload, meta::BUNDLE_ID)?;
    let version = required(payload, meta::VERSION)?;
    let build_number = required(payload, meta::BUILD_NUMBER)?;
    let app = &payload.app_name;
    let status = title_case(&payload.status);
    let app_version = payload.meta_str(meta::APP_VERSION).unwrap_or("N/A");
    let app_status = payload
        .meta_str(meta::APP_STATUS)
        .map(title_case)
        .unwrap_or_else(|| "N/A".to_string());

    let attachment = Attachment {
        fallback: Some(format!(
            "The status of build version {version} for your app {app} has been changed to {status}"
        )),
        fields: vec![
            Field::short("Build Version", format!("{version} ({build_number})")),
            Field::short("Build Status", status.clone()),
            Field::short("Version", app_version),
            Field::short("App Status", app_status),
        ],
        ..base_attachment(payload, bundle_id)
    };

    Ok(SlackMessage {
        text: format!(
            "The status of build version *{version}* for your app *{app}* has been changed to *{status}*"
        ),
        channel: None,
        attachments: vec![attachment],
    })
}
