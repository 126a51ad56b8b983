use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    Result,
};

/// Outbound messenger port. Telegram is the only implementation.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Send plain text (no parse mode) to a chat.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;
}
