//! Notification composer and delivery sinks.
//!
//! [`Composer`] turns [`NotificationPayload`](storewatch_core::NotificationPayload)s
//! into Slack-shaped [`SlackMessage`]s, one per change or one summary per
//! cycle. A [`DeliverySink`] sends the result somewhere.

pub mod colors;
mod composer;
mod error;
mod message;
pub mod sink;
mod templates;

pub use composer::{Composer, BATCH_DISPLAY_LIMIT};
pub use error::{ComposeError, DeliveryError};
pub use message::{Attachment, Field, SlackMessage};
pub use sink::{DeliverySink, RecordingSink, SlackWebhookSink, StdoutSink};
