//! News Digest Bot — Binary Entrypoint
//! Wires the Telegram transport, the news and translation providers, the
//! subscriber registry, and the two long-running loops (daily scheduler,
//! command poller).
//!
//! See `README.md` for setup and environment variables.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_digest_bot::app::AppState;
use news_digest_bot::bot;
use news_digest_bot::config::Config;
use news_digest_bot::delivery::DeliveryEngine;
use news_digest_bot::digest::DigestFormatter;
use news_digest_bot::providers::{ContentProvider, GoogleNewsProvider, GtxTranslator};
use news_digest_bot::scheduler;
use news_digest_bot::subscribers::SubscriberStore;
use news_digest_bot::telegram::TelegramClient;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_digest_bot=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local runs; a missing file is a no-op.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::from_env()?;
    info!(
        token = %config.masked_token(),
        subscribers_file = %config.subscribers_path.display(),
        topics = config.topics.len(),
        schedule = %config.schedule,
        "starting news digest bot"
    );

    let telegram = TelegramClient::new(&config.bot_token);
    let translator = Arc::new(
        GtxTranslator::new(config.target_lang.clone()).with_fallback(config.translation_fallback()),
    );
    let provider: Arc<dyn ContentProvider> = Arc::new(GoogleNewsProvider::new(translator));
    let store = Arc::new(SubscriberStore::load(config.subscribers_path.clone()));
    let formatter = DigestFormatter::new()
        .with_header(format!("📰 *DAILY NEWS UPDATES ({})*", config.schedule))
        .with_translation_label(config.translation_label());

    let app = Arc::new(AppState {
        provider,
        topics: config.topics.clone(),
        formatter,
        store,
        delivery: DeliveryEngine::new(telegram.clone()),
        schedule: config.schedule,
    });

    tokio::spawn(scheduler::run_daily(app.clone()));

    bot::run_bot(&telegram, &app).await
}
