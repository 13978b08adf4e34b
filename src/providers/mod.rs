//! Content providers.
//!
//! A provider turns a topic query into ready-to-render items. Providers
//! absorb their own failures: a dead feed or a bad payload becomes an empty
//! list plus a log line, never an error surfaced to the digest pipeline.

pub mod google_news;
pub mod translate;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::digest::ContentItem;

pub use google_news::GoogleNewsProvider;
pub use translate::{GtxTranslator, Translator};

#[async_trait::async_trait]
pub trait ContentProvider: Send + Sync {
    /// Fetch items for one topic query. Empty on any failure.
    async fn fetch(&self, topic: &str) -> Vec<ContentItem>;

    fn name(&self) -> &'static str;
}

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Normalize a raw feed headline: decode HTML entities, collapse runs of
/// whitespace, and cut the trailing `" - Publisher"` suffix the aggregator
/// appends.
pub fn clean_title(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    let collapsed = WHITESPACE.replace_all(decoded.as_ref(), " ");
    collapsed
        .trim()
        .split(" - ")
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

// --- Test helper ---

/// Provider with canned responses per topic. Unknown topics come back empty,
/// same as a provider whose fetch failed.
pub struct FixedProvider {
    pub by_topic: HashMap<String, Vec<ContentItem>>,
}

impl FixedProvider {
    pub fn new() -> Self {
        Self {
            by_topic: HashMap::new(),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>, items: Vec<ContentItem>) -> Self {
        self.by_topic.insert(topic.into(), items);
        self
    }
}

impl Default for FixedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ContentProvider for FixedProvider {
    async fn fetch(&self, topic: &str) -> Vec<ContentItem> {
        self.by_topic.get(topic).cloned().unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
