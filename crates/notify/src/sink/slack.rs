//! Slack incoming-webhook sink.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking`.

use async_trait::async_trait;
use serde::Serialize;
use ureq::http::Uri;

use super::DeliverySink;
use crate::{Attachment, DeliveryError, SlackMessage};

pub const DEFAULT_CHANNEL: &str = "#notifications";

#[derive(Debug, Clone)]
pub struct SlackWebhookSink {
    webhook_url: String,
    channel: String,
}

#[derive(Serialize)]
struct WebhookBody<'a> {
    text: &'a str,
    channel: &'a str,
    attachments: &'a [Attachment],
}

impl SlackWebhookSink {
    pub fn new(webhook_url: impl Into<String>, channel: Option<String>) -> Self {
        let channel = channel
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());
        tracing::info!(channel = %channel, "slack sink initialized");
        Self {
            webhook_url: webhook_url.into(),
            channel,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Parse the webhook URL: absolute http(s) with a host.
    pub fn validate_url(&self) -> Result<(), DeliveryError> {
        let uri: Uri = self
            .webhook_url
            .parse()
            .map_err(|e: ureq::http::uri::InvalidUri| DeliveryError::InvalidWebhook(e.to_string()))?;
        if !matches!(uri.scheme_str(), Some("https") | Some("http")) {
            return Err(DeliveryError::InvalidWebhook(
                "scheme must be http or https".to_string(),
            ));
        }
        if uri.host().map_or(true, str::is_empty) {
            return Err(DeliveryError::InvalidWebhook("missing host".to_string()));
        }
        Ok(())
    }

    /// POST `message` to the webhook. The message's own channel wins over
    /// the sink default.
    pub async fn send(&self, message: &SlackMessage) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(&WebhookBody {
            text: &message.text,
            channel: message.channel.as_deref().unwrap_or(&self.channel),
            attachments: &message.attachments,
        })?;
        let url = self.webhook_url.clone();

        tokio::task::spawn_blocking(move || {
            let agent = ureq::Agent::new_with_defaults();
            agent
                .post(&url)
                .header("Content-Type", "application/json")
                .send(&body[..])
                .map(|_| ())
                .map_err(|e| match e {
                    ureq::Error::StatusCode(code) => DeliveryError::Status(code),
                    other => DeliveryError::Transport(other.to_string()),
                })
        })
        .await
        .map_err(|e| DeliveryError::Transport(format!("task join error: {}", e)))?
    }
}

#[async_trait]
impl DeliverySink for SlackWebhookSink {
    fn name(&self) -> &str {
        "slack"
    }

    async fn deliver(&self, message: &SlackMessage) -> bool {
        let channel = message.channel.as_deref().unwrap_or(&self.channel);
        match self.send(message).await {
            Ok(()) => {
                tracing::info!(
                    channel = %channel,
                    attachments = message.attachments.len(),
                    "slack message sent"
                );
                true
            }
            Err(e) => {
                tracing::error!(channel = %channel, error = %e, "failed to send slack message");
                false
            }
        }
    }

    async fn check_connection(&self) -> bool {
        match self.validate_url() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "slack connection check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_channel_uses_default() {
        let sink = SlackWebhookSink::new("https://hooks.slack.com/services/T/B/x", Some(" ".into()));
        assert_eq!(sink.channel(), DEFAULT_CHANNEL);
    }

    #[tokio::test]
    async fn connection_check_validates_url_only() {
        let good = SlackWebhookSink::new("https://hooks.slack.com/services/T/B/x", None);
        assert!(good.check_connection().await);

        for bad in ["not a url", "hooks.slack.com/services", "ftp://hooks.slack.com/x"] {
            let sink = SlackWebhookSink::new(bad, None);
            assert!(!sink.check_connection().await, "{bad}");
        }
    }

    #[tokio::test]
    async fn unreachable_webhook_reports_false() {
        let sink = SlackWebhookSink::new("http://127.0.0.1:9/hook", None);
        let delivered = sink
            .deliver(&SlackMessage {
                text: "hi".into(),
                ..Default::default()
            })
            .await;
        assert!(!delivered);
    }
}
