//! Digest delivery with per-recipient failure isolation.
//!
//! One unreachable or blocked chat must never abort a broadcast run: every
//! recipient gets exactly one attempt, failures are logged and collected, and
//! the loop moves on.

use anyhow::Result;
use tracing::{debug, warn};

use crate::telegram::ChatId;

/// Narrow seam to the messaging platform. Production transport is
/// `TelegramClient`; tests substitute a recording mock.
#[async_trait::async_trait]
pub trait MessageTransport: Send + Sync {
    async fn deliver(&self, recipient: ChatId, text: &str) -> Result<()>;
}

/// Result of a single delivery attempt. No internal retries: a failure here
/// is final for this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastSummary {
    pub delivered: usize,
    pub failed: Vec<(ChatId, String)>,
}

impl BroadcastSummary {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed.len()
    }
}

pub struct DeliveryEngine<T: MessageTransport> {
    pub transport: T,
}

impl<T: MessageTransport> DeliveryEngine<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Best-effort single attempt to one recipient.
    pub async fn send_to_one(&self, recipient: ChatId, text: &str) -> DeliveryOutcome {
        match self.transport.deliver(recipient, text).await {
            Ok(()) => {
                debug!(recipient = %recipient, "message delivered");
                DeliveryOutcome::Delivered
            }
            // `{:#}` keeps the whole context chain on one line.
            Err(e) => DeliveryOutcome::Failed(format!("{e:#}")),
        }
    }

    /// Deliver `text` to every recipient, isolating failures per recipient.
    pub async fn broadcast(&self, recipients: &[ChatId], text: &str) -> BroadcastSummary {
        let mut summary = BroadcastSummary::default();
        for &recipient in recipients {
            match self.send_to_one(recipient, text).await {
                DeliveryOutcome::Delivered => summary.delivered += 1,
                DeliveryOutcome::Failed(reason) => {
                    warn!(
                        recipient = %recipient,
                        reason = %reason,
                        "delivery failed; continuing broadcast"
                    );
                    summary.failed.push((recipient, reason));
                }
            }
        }
        summary
    }
}

// --- Test helper ---

/// Recording transport: remembers every delivery and fails on demand.
pub struct MockTransport {
    pub sent: std::sync::Mutex<Vec<(ChatId, String)>>,
    pub fail_for: std::collections::HashSet<ChatId>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
            fail_for: std::collections::HashSet::new(),
        }
    }

    pub fn failing_for<I: IntoIterator<Item = ChatId>>(ids: I) -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
            fail_for: ids.into_iter().collect(),
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MessageTransport for MockTransport {
    async fn deliver(&self, recipient: ChatId, text: &str) -> Result<()> {
        if self.fail_for.contains(&recipient) {
            anyhow::bail!("simulated delivery failure");
        }
        self.sent
            .lock()
            .expect("mock transport mutex poisoned")
            .push((recipient, text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_to_one_reports_failure_reason() {
        let engine = DeliveryEngine::new(MockTransport::failing_for([ChatId(1)]));
        match engine.send_to_one(ChatId(1), "hi").await {
            DeliveryOutcome::Failed(reason) => {
                assert!(reason.contains("simulated delivery failure"))
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(engine.send_to_one(ChatId(2), "hi").await, DeliveryOutcome::Delivered);
    }

    #[tokio::test]
    async fn broadcast_counts_both_sides() {
        let engine = DeliveryEngine::new(MockTransport::failing_for([ChatId(2)]));
        let summary = engine
            .broadcast(&[ChatId(1), ChatId(2), ChatId(3)], "digest")
            .await;
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, ChatId(2));
        assert_eq!(summary.attempted(), 3);
    }

    #[tokio::test]
    async fn broadcast_of_empty_list_is_a_noop() {
        let engine = DeliveryEngine::new(MockTransport::new());
        let summary = engine.broadcast(&[], "digest").await;
        assert_eq!(summary, BroadcastSummary::default());
        assert!(engine.transport.sent.lock().unwrap().is_empty());
    }
}
