//! Command handlers.
//!
//! Each handler makes at most one backend call and sends exactly one chat
//! message. Nothing is kept between updates.

use std::sync::Arc;

use crate::{
    command::Command,
    domain::{ChatId, IncomingUpdate},
    envelope::Envelope,
    messaging::port::MessagingPort,
    ports::{RemoveRequest, StopRequest, TrackRequest, TrackerApi},
    Result,
};

pub const WELCOME_TEXT: &str = "👋 Welcome! Send me a product link to track prices.";

pub const HELP_TEXT: &str = "🔹 Available Commands:
➡ /track {Product Link} - Add product to tracking list
➡ /stop - Stop tracking all products
➡ /stop_{Product_ID} - Stop tracking a specific product
➡ /list - Get your tracking list";

pub const UNKNOWN_TEXT: &str = "Unknown command! Use /help to see available commands.";

pub const TRACK_OK: &str = "✅ Product added for tracking!";
pub const TRACK_FAILED: &str = "❌ Error tracking product.";
pub const LIST_FAILED: &str = "❌ Error fetching your tracked products.";
pub const STOP_OK: &str = "✅ Stopped tracking all products.";
pub const STOP_FAILED: &str = "❌ Error stopping tracking.";
pub const STOP_ONE_FAILED: &str = "❌ Error stopping tracking for this product.";

pub struct PriceTrackerBot {
    api: Arc<dyn TrackerApi>,
    messenger: Arc<dyn MessagingPort>,
}

impl PriceTrackerBot {
    pub fn new(api: Arc<dyn TrackerApi>, messenger: Arc<dyn MessagingPort>) -> Self {
        Self { api, messenger }
    }

    /// Handle one inbound update. Updates without a message are the caller's
    /// to skip; a message without text is treated as empty text.
    pub async fn handle_update(&self, update: IncomingUpdate) {
        let text = update.text.unwrap_or_default();
        self.handle_text(update.chat_id, &text).await;
    }

    pub async fn handle_text(&self, chat_id: ChatId, text: &str) {
        let command = Command::parse(text);
        tracing::debug!(chat_id = chat_id.0, command = command.name(), "dispatching");

        match command {
            Command::Start => self.handle_start(chat_id).await,
            Command::Help => self.handle_help(chat_id).await,
            Command::Track(url) => self.handle_track(chat_id, &url).await,
            Command::List => self.handle_list(chat_id).await,
            Command::StopAll => self.handle_stop(chat_id).await,
            Command::StopOne(product_id) => self.handle_stop_one(chat_id, &product_id).await,
            Command::Unknown => self.handle_unknown(chat_id).await,
        }
    }

    pub async fn handle_start(&self, chat_id: ChatId) {
        self.send(chat_id, WELCOME_TEXT).await;
    }

    pub async fn handle_help(&self, chat_id: ChatId) {
        self.send(chat_id, HELP_TEXT).await;
    }

    pub async fn handle_track(&self, chat_id: ChatId, url: &str) {
        let req = TrackRequest::new(chat_id, url);
        let reply = match succeeded("track", self.api.track(&req).await) {
            Some(_) => TRACK_OK,
            None => TRACK_FAILED,
        };
        self.send(chat_id, reply).await;
    }

    pub async fn handle_list(&self, chat_id: ChatId) {
        let reply = match succeeded("list", self.api.list().await) {
            Some(env) => format!("📋 Your Tracked Products:\n{}", env.display_data()),
            None => LIST_FAILED.to_string(),
        };
        self.send(chat_id, &reply).await;
    }

    pub async fn handle_stop(&self, chat_id: ChatId) {
        let req = StopRequest::new(chat_id);
        let reply = match succeeded("stop", self.api.stop(&req).await) {
            Some(_) => STOP_OK,
            None => STOP_FAILED,
        };
        self.send(chat_id, reply).await;
    }

    pub async fn handle_stop_one(&self, chat_id: ChatId, product_id: &str) {
        let req = RemoveRequest::new(chat_id, product_id);
        let reply = match succeeded("remove", self.api.remove(&req).await) {
            Some(_) => format!("✅ Stopped tracking product ID: {product_id}"),
            None => STOP_ONE_FAILED.to_string(),
        };
        self.send(chat_id, &reply).await;
    }

    pub async fn handle_unknown(&self, chat_id: ChatId) {
        self.send(chat_id, UNKNOWN_TEXT).await;
    }

    async fn send(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.messenger.send_text(chat_id, text).await {
            tracing::warn!(chat_id = chat_id.0, "failed to send reply: {e}");
        }
    }
}

/// Collapse transport failures and rejected envelopes into `None`, logging the cause.
fn succeeded(op: &str, res: Result<Envelope>) -> Option<Envelope> {
    match res {
        Ok(env) if env.is_success() => Some(env),
        Ok(env) => {
            let (code, message) = env
                .error
                .as_ref()
                .map(|e| (e.code, e.message.as_str()))
                .unwrap_or((0, ""));
            tracing::warn!(op, code, reason = message, "backend rejected request");
            None
        }
        Err(e) => {
            tracing::warn!(op, "backend call failed: {e}");
            None
        }
    }
}
