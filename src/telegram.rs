//! Minimal Telegram Bot API client: `sendMessage` plus `getUpdates` long
//! polling. Only the handful of fields this bot reads are modeled; everything
//! else in the API envelope is ignored.

use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::bot::UpdateSource;
use crate::delivery::MessageTransport;

pub const API_BASE: &str = "https://api.telegram.org";

/// Per-request timeout for plain calls; long polls extend this by the poll
/// timeout so the held-open connection is not cut short.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Identifier of a Telegram chat (one subscriber or one requester).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

/// The `{ok, result, description}` envelope every Bot API method returns.
#[derive(Debug, Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: ChatId,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct GetUpdatesPayload {
    offset: i64,
    timeout: u64,
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self {
            client,
            base: format!("{API_BASE}/bot{token}"),
        }
    }

    /// Single delivery attempt: Markdown text with link previews disabled
    /// (some chats render previews, some disable them; the message must read
    /// fine either way, so the link stays inline).
    pub async fn send_message(&self, chat: ChatId, text: &str) -> Result<()> {
        let payload = SendMessagePayload {
            chat_id: chat,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };
        let resp = self
            .client
            .post(format!("{}/sendMessage", self.base))
            .json(&payload)
            .send()
            .await
            .context("sendMessage http post")?;
        let status = resp.status();
        let reply: ApiReply<serde_json::Value> = resp
            .json()
            .await
            .with_context(|| format!("sendMessage response body ({status})"))?;
        if !reply.ok {
            bail!(
                "telegram api: {}",
                reply.description.unwrap_or_else(|| status.to_string())
            );
        }
        Ok(())
    }

    /// Long poll for new updates. `offset` acknowledges everything below it.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let payload = GetUpdatesPayload {
            offset,
            timeout: timeout_secs,
        };
        let resp = self
            .client
            .post(format!("{}/getUpdates", self.base))
            .timeout(REQUEST_TIMEOUT + Duration::from_secs(timeout_secs))
            .json(&payload)
            .send()
            .await
            .context("getUpdates http post")?;
        let status = resp.status();
        let reply: ApiReply<Vec<Update>> = resp
            .json()
            .await
            .with_context(|| format!("getUpdates response body ({status})"))?;
        if !reply.ok {
            bail!(
                "telegram api: {}",
                reply.description.unwrap_or_else(|| status.to_string())
            );
        }
        Ok(reply.result.unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl MessageTransport for TelegramClient {
    async fn deliver(&self, recipient: ChatId, text: &str) -> Result<()> {
        self.send_message(recipient, text).await
    }
}

#[async_trait::async_trait]
impl UpdateSource for TelegramClient {
    async fn poll(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.get_updates(offset, timeout_secs).await
    }
}
