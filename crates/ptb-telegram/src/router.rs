use std::sync::Arc;

use anyhow::Context;
use teloxide::{
    dispatching::{Dispatcher, UpdateHandler},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::Update,
};

use ptb_core::{bot::PriceTrackerBot, config::Config};

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<PriceTrackerBot>,
}

/// Build the Telegram client and verify the credential with `getMe`.
pub async fn connect(cfg: &Config) -> anyhow::Result<Bot> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let me = bot
        .get_me()
        .await
        .context("telegram rejected the bot credential")?;
    tracing::info!(username = %me.username(), "authorized on telegram");
    Ok(bot)
}

/// Only message updates reach a handler; the rest fall through to the
/// dispatcher's default handler.
pub fn schema() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message))
}

/// One key for every update: the dispatcher keeps a single worker.
pub fn sequential_key(_: &Update) -> Option<()> {
    Some(())
}

/// Consume updates until Ctrl-C.
///
/// Every update maps to the same distribution key, so the dispatcher runs a
/// single worker and each handler finishes before the next update starts.
pub async fn run_polling(bot: Bot, price_bot: Arc<PriceTrackerBot>) -> anyhow::Result<()> {
    let state = Arc::new(AppState { bot: price_bot });

    tracing::info!("bot is running");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .distribution_function(sequential_key)
        .default_handler(|upd: Arc<Update>| async move {
            tracing::trace!(update = ?upd.id, "skipping update without a message");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "error in message handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("dispatcher stopped");
    Ok(())
}
