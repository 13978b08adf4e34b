//! Command handling and the long-poll loop.
//!
//! Two commands only: subscribing and an on-demand digest. Anything else in
//! the chat is ignored. Replies go to the requesting chat alone; only the
//! scheduler fans out to the whole registry.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::delivery::{DeliveryOutcome, MessageTransport};
use crate::digest::Topic;
use crate::scheduler::ScheduleSpec;
use crate::telegram::{ChatId, Update};

/// Long-poll hold time. The server answers early when updates arrive.
pub const POLL_TIMEOUT_SECS: u64 = 30;
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

pub const FETCHING_TEXT: &str = "🔎 Fetching latest news... Please wait.";
pub const UNAVAILABLE_TEXT: &str = "Sorry, news fetch nahi ho pa raha hai.";

/// Inbound counterpart of [`MessageTransport`]: where updates come from.
/// Production polls the Telegram API; tests substitute a scripted feed.
#[async_trait::async_trait]
pub trait UpdateSource: Send + Sync {
    async fn poll(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Subscribe,
    News,
}

/// Extract a command from message text. The command is the first token,
/// with any `@botname` suffix stripped so group mentions work.
pub fn parse_command(text: &str) -> Option<Command> {
    let token = text.trim().split_whitespace().next()?;
    let command = token.split('@').next().unwrap_or(token);
    match command {
        "/start" | "/subscribe" => Some(Command::Subscribe),
        "/news" => Some(Command::News),
        _ => None,
    }
}

pub fn welcome_text(schedule: &ScheduleSpec, topics: &[Topic]) -> String {
    let topic_list = topics
        .iter()
        .map(|t| t.query.as_str())
        .collect::<Vec<_>>()
        .join(" aur ");
    format!(
        "👋 *Namaste! I am your Daily News Bot.*\n\n\
         Ab aapko daily subah *{schedule}* baje {topic_list} ki latest news milenge.\n\n\
         Commands:\n\
         🚀 /news - Get news instantly"
    )
}

async fn reply<T: MessageTransport>(app: &AppState<T>, chat: ChatId, text: &str) {
    if let DeliveryOutcome::Failed(reason) = app.delivery.send_to_one(chat, text).await {
        warn!(chat = %chat, reason = %reason, "reply delivery failed");
    }
}

async fn handle_subscribe<T: MessageTransport>(app: &AppState<T>, chat: ChatId) {
    if app.store.add(chat) {
        info!(chat = %chat, total = app.store.len(), "new subscriber registered");
    } else {
        debug!(chat = %chat, "existing subscriber re-registered");
    }
    // The welcome goes out either way so re-sent /start still gets an answer.
    let welcome = welcome_text(&app.schedule, &app.topics);
    reply(app, chat, &welcome).await;
}

async fn handle_news<T: MessageTransport>(app: &AppState<T>, chat: ChatId) {
    reply(app, chat, FETCHING_TEXT).await;
    match app.build_digest().await {
        Some(digest) => {
            let text = app.formatter.render(&digest);
            reply(app, chat, &text).await;
        }
        None => reply(app, chat, UNAVAILABLE_TEXT).await,
    }
}

/// Dispatch one update. Updates without a text message are skipped.
pub async fn handle_update<T: MessageTransport>(app: &AppState<T>, update: &Update) {
    let Some(message) = &update.message else {
        return;
    };
    let Some(text) = &message.text else {
        return;
    };
    let chat = message.chat.id;
    match parse_command(text) {
        Some(Command::Subscribe) => handle_subscribe(app, chat).await,
        Some(Command::News) => handle_news(app, chat).await,
        None => {}
    }
}

/// Poll for updates forever. A failed poll backs off and retries; the
/// acknowledged offset only moves forward once an update is handled.
pub async fn run_bot<S, T>(source: &S, app: &AppState<T>) -> Result<()>
where
    S: UpdateSource,
    T: MessageTransport,
{
    info!("command loop started");
    let mut offset: i64 = 0;
    loop {
        let updates = match source.poll(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = ?e, "update poll failed; backing off");
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                continue;
            }
        };
        for update in &updates {
            offset = offset.max(update.update_id + 1);
            handle_update(app, update).await;
        }
    }
}
