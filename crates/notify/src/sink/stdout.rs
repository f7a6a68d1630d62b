use async_trait::async_trait;

use super::DeliverySink;
use crate::SlackMessage;

/// Prints each message as pretty JSON. Used for dry runs.
#[derive(Debug, Clone, Default)]
pub struct StdoutSink;

#[async_trait]
impl DeliverySink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn deliver(&self, message: &SlackMessage) -> bool {
        match serde_json::to_string_pretty(message) {
            Ok(json) => {
                println!("{json}");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to encode message");
                false
            }
        }
    }

    async fn check_connection(&self) -> bool {
        true
    }
}
