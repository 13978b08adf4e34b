//! Shared application state and the broadcast pipeline.

use std::sync::Arc;

use crate::delivery::{BroadcastSummary, DeliveryEngine, MessageTransport};
use crate::digest::{self, Digest, DigestFormatter, Topic};
use crate::providers::ContentProvider;
use crate::scheduler::ScheduleSpec;
use crate::subscribers::SubscriberStore;

/// Everything the scheduler and the command loop share. Generic over the
/// transport so tests run the same pipeline against a mock.
pub struct AppState<T: MessageTransport> {
    pub provider: Arc<dyn ContentProvider>,
    pub topics: Vec<Topic>,
    pub formatter: DigestFormatter,
    pub store: Arc<SubscriberStore>,
    pub delivery: DeliveryEngine<T>,
    pub schedule: ScheduleSpec,
}

/// What a broadcast cycle did. `Skipped` means every topic came back empty
/// and no message went out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    Skipped,
    Sent(BroadcastSummary),
}

impl<T: MessageTransport> AppState<T> {
    /// Fetch all configured topics and assemble a fresh digest.
    pub async fn build_digest(&self) -> Option<Digest> {
        digest::collect(self.provider.as_ref(), &self.topics).await
    }

    /// One broadcast cycle: build, render once, deliver to every subscriber.
    pub async fn broadcast_digest(&self) -> BroadcastOutcome {
        let Some(digest) = self.build_digest().await else {
            return BroadcastOutcome::Skipped;
        };
        let text = self.formatter.render(&digest);
        let recipients = self.store.snapshot();
        let summary = self.delivery.broadcast(&recipients, &text).await;
        BroadcastOutcome::Sent(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::MockTransport;
    use crate::digest::ContentItem;
    use crate::providers::FixedProvider;
    use crate::telegram::ChatId;

    fn app_with(provider: FixedProvider) -> AppState<MockTransport> {
        let dir = tempfile::tempdir().unwrap();
        let store = SubscriberStore::load(dir.path().join("subs.json"));
        store.add(ChatId(1));
        store.add(ChatId(2));
        AppState {
            provider: Arc::new(provider),
            topics: vec![Topic::new("India", "🇮🇳 INDIA")],
            formatter: DigestFormatter::new(),
            store: Arc::new(store),
            delivery: DeliveryEngine::new(MockTransport::new()),
            schedule: ScheduleSpec::new(8, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn broadcast_skips_when_every_topic_is_empty() {
        let app = app_with(FixedProvider::new());
        assert_eq!(app.broadcast_digest().await, BroadcastOutcome::Skipped);
        assert!(app.delivery.transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn broadcast_sends_one_identical_message_per_subscriber() {
        let item = ContentItem {
            title: "Headline".into(),
            translation: "शीर्षक".into(),
            link: "https://example.com/a".into(),
        };
        let app = app_with(FixedProvider::new().with_topic("India", vec![item]));
        match app.broadcast_digest().await {
            BroadcastOutcome::Sent(summary) => {
                assert_eq!(summary.delivered, 2);
                assert!(summary.failed.is_empty());
            }
            other => panic!("expected sent, got {other:?}"),
        }
        let sent = app.delivery.transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, sent[1].1);
    }
}
