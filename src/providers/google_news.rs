//! Google News RSS provider.
//!
//! Queries the search feed for a topic, keeps the first few entries, cleans
//! their titles, and pairs each with a translation. The provider can also be
//! fed a canned RSS document so the full pipeline runs without a network.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::digest::{ContentItem, MAX_ITEMS_PER_TOPIC};
use crate::providers::translate::Translator;
use crate::providers::{clean_title, ContentProvider};

pub const DEFAULT_BASE_URL: &str = "https://news.google.com/rss/search";

// Feed edition parameters. The feed serves the Indian English edition so
// regional topics resolve to local coverage.
const EDITION_LANG: &str = "en-IN";
const EDITION_COUNTRY: &str = "IN";
const EDITION_ID: &str = "IN:en";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
// The feed answers plain library user agents with consent interstitials.
const USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
}

enum Mode {
    Http { base_url: String, client: Client },
    Fixture(String),
}

pub struct GoogleNewsProvider {
    mode: Mode,
    translator: Arc<dyn Translator>,
    max_items: usize,
}

impl GoogleNewsProvider {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self::from_url(DEFAULT_BASE_URL, translator)
    }

    pub fn from_url(base_url: impl Into<String>, translator: Arc<dyn Translator>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self {
            mode: Mode::Http {
                base_url: base_url.into(),
                client,
            },
            translator,
            max_items: MAX_ITEMS_PER_TOPIC,
        }
    }

    /// Parse a canned RSS document instead of calling out. Every topic gets
    /// the same feed.
    pub fn from_fixture(xml: impl Into<String>, translator: Arc<dyn Translator>) -> Self {
        Self {
            mode: Mode::Fixture(xml.into()),
            translator,
            max_items: MAX_ITEMS_PER_TOPIC,
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    async fn fetch_feed(&self, topic: &str) -> Result<String> {
        match &self.mode {
            Mode::Fixture(xml) => Ok(xml.clone()),
            Mode::Http { base_url, client } => {
                let response = client
                    .get(base_url)
                    .query(&[
                        ("q", topic),
                        ("hl", EDITION_LANG),
                        ("gl", EDITION_COUNTRY),
                        ("ceid", EDITION_ID),
                    ])
                    .send()
                    .await
                    .context("news feed request failed")?
                    .error_for_status()
                    .context("news feed request rejected")?;
                response.text().await.context("reading news feed body")
            }
        }
    }

    async fn fetch_inner(&self, topic: &str) -> Result<Vec<ContentItem>> {
        let xml = self.fetch_feed(topic).await?;
        let rss: Rss = quick_xml::de::from_str(&xml).context("parsing news feed xml")?;
        let mut items = Vec::new();
        // The window is the first `max_items` feed entries; a bad entry
        // inside it is skipped, not backfilled from later ones.
        for entry in rss.channel.items.into_iter().take(self.max_items) {
            let Some(raw_title) = entry.title else {
                continue;
            };
            let title = clean_title(&raw_title);
            if title.is_empty() {
                continue;
            }
            let link = entry.link.unwrap_or_default();
            let translation = self.translator.translate(&title).await;
            items.push(ContentItem {
                title,
                translation,
                link,
            });
        }
        Ok(items)
    }
}

#[async_trait::async_trait]
impl ContentProvider for GoogleNewsProvider {
    async fn fetch(&self, topic: &str) -> Vec<ContentItem> {
        match self.fetch_inner(topic).await {
            Ok(items) => {
                debug!(topic, count = items.len(), "news feed fetched");
                items
            }
            Err(e) => {
                warn!(topic, error = ?e, "news fetch failed; topic skipped this cycle");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "google-news"
    }
}
