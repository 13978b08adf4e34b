// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod app;
pub mod bot;
pub mod config;
pub mod delivery;
pub mod digest;
pub mod providers;
pub mod scheduler;
pub mod subscribers;
pub mod telegram;

// ---- Re-exports for stable public API ----
pub use crate::app::{AppState, BroadcastOutcome};
pub use crate::bot::UpdateSource;
pub use crate::delivery::{BroadcastSummary, DeliveryEngine, DeliveryOutcome, MessageTransport};
pub use crate::digest::{ContentItem, Digest, DigestFormatter, Topic};
pub use crate::providers::ContentProvider;
pub use crate::scheduler::ScheduleSpec;
pub use crate::subscribers::SubscriberStore;
pub use crate::telegram::{ChatId, TelegramClient};
