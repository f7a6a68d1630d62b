use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::DeliverySink;
use crate::SlackMessage;

/// Keeps every delivered message in memory. Can be told to reject.
#[derive(Debug)]
pub struct RecordingSink {
    messages: Mutex<Vec<SlackMessage>>,
    accept: AtomicBool,
    reachable: AtomicBool,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            accept: AtomicBool::new(true),
            reachable: AtomicBool::new(true),
        }
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail (nothing is recorded while rejecting).
    pub fn set_accepting(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub async fn messages(&self) -> Vec<SlackMessage> {
        self.messages.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, message: &SlackMessage) -> bool {
        if !self.accept.load(Ordering::SeqCst) {
            return false;
        }
        self.messages.lock().await.push(message.clone());
        true
    }

    async fn check_connection(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_until_told_to_reject() {
        let sink = RecordingSink::new();
        let msg = SlackMessage {
            text: "one".into(),
            ..Default::default()
        };
        assert!(sink.deliver(&msg).await);
        sink.set_accepting(false);
        assert!(!sink.deliver(&msg).await);
        assert_eq!(sink.len().await, 1);
    }
}
