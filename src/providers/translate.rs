//! Headline translation via the public gtx endpoint.
//!
//! Translation is best effort. Any failure, from network trouble to an
//! unexpected payload shape, yields the configured fallback string so the
//! digest always carries both language lines.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";
pub const FALLBACK_TRANSLATION: &str = "Hindi translation unavailable.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Mozilla/5.0";

#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text`, falling back to a placeholder on failure. Never
    /// fails outward.
    async fn translate(&self, text: &str) -> String;
}

pub struct GtxTranslator {
    client: Client,
    base_url: String,
    source_lang: String,
    target_lang: String,
    fallback: String,
}

impl GtxTranslator {
    pub fn new(target_lang: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            source_lang: "en".to_string(),
            target_lang: target_lang.into(),
            fallback: FALLBACK_TRANSLATION.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    async fn translate_inner(&self, text: &str) -> Result<String> {
        let url = format!("{}/translate_a/single", self.base_url);
        let payload: Value = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_lang.as_str()),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .context("translation request failed")?
            .error_for_status()
            .context("translation request rejected")?
            .json()
            .await
            .context("translation payload was not json")?;
        first_fragment(&payload)
            .filter(|s| !s.is_empty())
            .context("translation payload had no text fragment")
    }
}

#[async_trait::async_trait]
impl Translator for GtxTranslator {
    async fn translate(&self, text: &str) -> String {
        match self.translate_inner(text).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(error = ?e, "translation unavailable; using fallback");
                self.fallback.clone()
            }
        }
    }
}

/// The gtx payload nests the translated text at `[0][0][0]`.
fn first_fragment(payload: &Value) -> Option<String> {
    Some(payload.get(0)?.get(0)?.get(0)?.as_str()?.to_string())
}

// --- Test helper ---

/// Translator that tags its input instead of calling out.
pub struct EchoTranslator;

#[async_trait::async_trait]
impl Translator for EchoTranslator {
    async fn translate(&self, text: &str) -> String {
        format!("{text} [translated]")
    }
}
