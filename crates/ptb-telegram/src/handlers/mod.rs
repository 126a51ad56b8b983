//! Telegram update handlers.
//!
//! Translate a teloxide `Message` into the core's `IncomingUpdate` and hand it
//! to the command handlers. Replies go out through the messaging port.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use ptb_core::domain::{ChatId, IncomingUpdate};

use crate::router::AppState;

pub fn incoming_update(msg: &Message) -> IncomingUpdate {
    IncomingUpdate {
        chat_id: ChatId(msg.chat.id.0),
        text: msg.text().map(str::to_string),
    }
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let update = incoming_update(&msg);
    tracing::debug!(chat_id = update.chat_id.0, "message received");
    state.bot.handle_update(update).await;
    Ok(())
}
