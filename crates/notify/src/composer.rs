use std::collections::BTreeSet;

use storewatch_core::text::status_emoji;
use storewatch_core::{NotificationPayload, Platform};
use time::OffsetDateTime;
use tracing::{debug, error};

use crate::colors::{platform_color, status_color};
use crate::templates;
use crate::{Attachment, ComposeError, Field, SlackMessage};

/// Itemized rows per platform in a batch message.
pub const BATCH_DISPLAY_LIMIT: usize = 5;

/// Renders payloads into Slack messages.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    channel: Option<String>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address every composed message to `channel`.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Render one payload through its platform template.
    ///
    /// Never fails: a template error is logged and the payload is rendered
    /// with the generic fallback instead.
    pub fn compose(&self, payload: &NotificationPayload) -> SlackMessage {
        debug!(
            platform = %payload.platform,
            app = %payload.app_name,
            status = %payload.status,
            "composing message"
        );
        match self.try_compose(payload) {
            Ok(message) => message,
            Err(e) => {
                error!(platform = %payload.platform, error = %e, "template failed, using fallback");
                self.fallback(payload)
            }
        }
    }

    /// Template rendering without the fallback.
    pub fn try_compose(&self, payload: &NotificationPayload) -> Result<SlackMessage, ComposeError> {
        let mut message = templates::render(payload)?;
        stamp(&mut message.attachments, payload.platform, payload.timestamp);
        message.channel = self.channel.clone();
        Ok(message)
    }

    /// `<emoji> <app> - <status>` with the plain message as attachment text.
    pub fn fallback(&self, payload: &NotificationPayload) -> SlackMessage {
        let emoji = status_emoji(payload.platform, &payload.status);
        let mut attachments = vec![Attachment {
            color: Some(status_color(payload.platform, &payload.status).to_string()),
            text: Some(payload.message.clone()),
            ..Default::default()
        }];
        stamp(&mut attachments, payload.platform, payload.timestamp);
        SlackMessage {
            text: format!("{emoji} {} - {}", payload.app_name, payload.status),
            channel: self.channel.clone(),
            attachments,
        }
    }

    /// One message for everything that fired in a cycle.
    ///
    /// A single payload renders exactly like [`compose`](Self::compose).
    /// Otherwise payloads are grouped by platform, each group itemizing at
    /// most [`BATCH_DISPLAY_LIMIT`] changes and folding the rest into one
    /// `Additional Updates` row.
    pub fn compose_batch(
        &self,
        payloads: &[NotificationPayload],
    ) -> Result<SlackMessage, ComposeError> {
        match payloads {
            [] => Err(ComposeError::EmptyBatch),
            [single] => Ok(self.compose(single)),
            _ => {
                let mut attachments = Vec::new();
                for platform in Platform::ALL {
                    let group: Vec<&NotificationPayload> =
                        payloads.iter().filter(|p| p.platform == platform).collect();
                    if !group.is_empty() {
                        attachments.push(summary_attachment(platform, &group));
                    }
                }
                Ok(SlackMessage {
                    text: format!(
                        "📱 {} app updates across {} platform(s)",
                        payloads.len(),
                        attachments.len()
                    ),
                    channel: self.channel.clone(),
                    attachments,
                })
            }
        }
    }
}

fn default_footer(platform: Platform) -> String {
    format!("Store Notifier • {}", platform.label())
}

/// Fill in footer and timestamp where a template left them unset.
fn stamp(attachments: &mut [Attachment], platform: Platform, at: OffsetDateTime) {
    for attachment in attachments {
        if attachment.footer.is_none() {
            attachment.footer = Some(default_footer(platform));
        }
        if attachment.ts.is_none() {
            attachment.ts = Some(at.unix_timestamp().to_string());
        }
    }
}

fn summary_attachment(platform: Platform, group: &[&NotificationPayload]) -> Attachment {
    let apps: BTreeSet<&str> = group.iter().map(|p| p.app_name.as_str()).collect();

    let mut fields: Vec<Field> = group
        .iter()
        .take(BATCH_DISPLAY_LIMIT)
        .map(|p| Field::long(p.app_name.clone(), p.message.clone()))
        .collect();
    let overflow = group.len().saturating_sub(BATCH_DISPLAY_LIMIT);
    if overflow > 0 {
        fields.push(Field::long(
            "Additional Updates",
            format!("+{overflow} more updates"),
        ));
    }

    let latest = group.iter().map(|p| p.timestamp).max();

    let mut attachment = Attachment {
        color: Some(platform_color(platform).to_string()),
        title: Some(format!("{} Updates", platform.label())),
        text: Some(format!(
            "{} update(s) for {} app(s)",
            group.len(),
            apps.len()
        )),
        fields,
        ..Default::default()
    };
    if let Some(at) = latest {
        stamp(std::slice::from_mut(&mut attachment), platform, at);
    }
    attachment
}
