//! Delivery sinks.
//!
//! A sink reports failure as `false` from [`DeliverySink::deliver`] rather than
//! as an error, so a rejected message never aborts the caller's cycle.

mod recording;
mod slack;
mod stdout;

use async_trait::async_trait;

use crate::SlackMessage;

pub use recording::RecordingSink;
pub use slack::{SlackWebhookSink, DEFAULT_CHANNEL};
pub use stdout::StdoutSink;

#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Short name used in logs and status output.
    fn name(&self) -> &str;

    /// Send `message`. `false` when the sink rejected it or was unreachable.
    async fn deliver(&self, message: &SlackMessage) -> bool;

    /// Whether the sink looks reachable. Called at startup and by health checks.
    async fn check_connection(&self) -> bool;
}
