use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    Result,
};

/// Messaging port.
///
/// Telegram (MTProto user session) is the first implementation; the shape is
/// small enough that other transports could fit behind it. Both operations may
/// fail with `Error::RateLimited` when the platform signals a flood wait; the
/// adapter is expected to have already slept and retried once before that
/// error reaches a caller.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Send a markdown-formatted message, optionally as a reply.
    async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageRef>;

    /// Edit a previously observed or sent message in place.
    async fn edit(&self, msg: MessageRef, text: &str) -> Result<()>;
}
