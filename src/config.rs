//! Process configuration from environment variables.
//!
//! Only the bot token is required. Everything else has a sensible default,
//! but a value that is present and malformed is fatal at startup rather than
//! silently replaced.

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};

use crate::digest::Topic;
use crate::scheduler::ScheduleSpec;

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_SUBSCRIBERS_PATH: &str = "SUBSCRIBERS_PATH";
pub const ENV_TOPICS: &str = "NEWS_TOPICS";
pub const ENV_DIGEST_TIME: &str = "DIGEST_TIME";
pub const ENV_TARGET_LANG: &str = "TRANSLATE_LANG";

/// Value shipped in setup instructions; refusing it catches unconfigured
/// deployments before they hammer the API with a junk token.
pub const TOKEN_PLACEHOLDER: &str = "YOUR_TOKEN_HERE";

const DEFAULT_SUBSCRIBERS_PATH: &str = "subscribers.json";
const DEFAULT_DIGEST_TIME: &str = "08:00:00";
const DEFAULT_TARGET_LANG: &str = "hi";

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub subscribers_path: PathBuf,
    pub topics: Vec<Topic>,
    pub schedule: ScheduleSpec,
    pub target_lang: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let raw_token = std::env::var(ENV_BOT_TOKEN)
            .with_context(|| format!("{ENV_BOT_TOKEN} is not set"))?;
        let bot_token = sanitize_token(&raw_token);
        ensure!(
            !bot_token.is_empty(),
            "{ENV_BOT_TOKEN} is empty after dropping non-printable characters"
        );
        ensure!(
            bot_token != TOKEN_PLACEHOLDER,
            "{ENV_BOT_TOKEN} still holds the placeholder value"
        );

        let subscribers_path: PathBuf = std::env::var(ENV_SUBSCRIBERS_PATH)
            .unwrap_or_else(|_| DEFAULT_SUBSCRIBERS_PATH.to_string())
            .into();

        let topics = match std::env::var(ENV_TOPICS) {
            Ok(raw) => parse_topics(&raw),
            Err(_) => default_topics(),
        };

        let schedule = match std::env::var(ENV_DIGEST_TIME) {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid {ENV_DIGEST_TIME}"))?,
            Err(_) => DEFAULT_DIGEST_TIME.parse().expect("default schedule"),
        };

        let target_lang =
            std::env::var(ENV_TARGET_LANG).unwrap_or_else(|_| DEFAULT_TARGET_LANG.to_string());

        Ok(Self {
            bot_token,
            subscribers_path,
            topics,
            schedule,
            target_lang,
        })
    }

    /// Token form safe for logs: enough to tell deployments apart, never the
    /// whole secret.
    pub fn masked_token(&self) -> String {
        mask_token(&self.bot_token)
    }

    /// Label shown before each translated line in the digest.
    pub fn translation_label(&self) -> String {
        language_label(&self.target_lang)
    }

    /// Notice substituted when a translation call fails.
    pub fn translation_fallback(&self) -> String {
        format!("{} translation unavailable.", self.translation_label())
    }
}

/// Tokens pasted from dashboards pick up stray whitespace and invisible
/// characters; keep printable ASCII only.
fn sanitize_token(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_graphic()).collect()
}

fn mask_token(token: &str) -> String {
    if token.len() > 10 {
        format!("{}...{}", &token[..5], &token[token.len() - 5..])
    } else {
        "SHORT_TOKEN".to_string()
    }
}

pub fn default_topics() -> Vec<Topic> {
    vec![topic_for_query("Chhattisgarh"), topic_for_query("India")]
}

/// The stock queries keep their original section labels, so spelling the
/// default list out in the environment changes nothing. Anything else gets a
/// generic newspaper heading.
fn topic_for_query(query: &str) -> Topic {
    match query {
        "Chhattisgarh" => Topic::new(query, "📍 CHHATTISGARH"),
        "India" => Topic::new(query, "🇮🇳 INDIA"),
        other => Topic::new(other, format!("📰 {}", other.to_uppercase())),
    }
}

/// The stock language keeps its English name; any other code is shown
/// uppercased.
fn language_label(code: &str) -> String {
    match code {
        "hi" => "Hindi".to_string(),
        other => other.to_uppercase(),
    }
}

/// Comma-separated topic list. An effectively empty list falls back to the
/// defaults.
fn parse_topics(raw: &str) -> Vec<Topic> {
    let topics: Vec<Topic> = raw
        .split(',')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(topic_for_query)
        .collect();
    if topics.is_empty() {
        default_topics()
    } else {
        topics
    }
}
