/// Telegram chat id (numeric). Doubles as the backend `user_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a sent Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// One inbound unit of work: the chat it came from and its text, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingUpdate {
    pub chat_id: ChatId,
    pub text: Option<String>,
}
