use crate::domain::{ChatId, MessageId, MessageRef};

/// Incoming message snapshot, normalized from the transport.
#[derive(Clone, Debug)]
pub struct Incoming {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    /// Message text; empty for non-text messages.
    pub text: String,
    /// Sent by the account itself.
    pub outgoing: bool,
    /// One-to-one chat.
    pub private: bool,
    pub has_media: bool,
}

impl Incoming {
    pub fn reference(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat_id,
            message_id: self.message_id,
        }
    }
}

/// Message-selection policy. The two modes are mutually exclusive per
/// deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyMode {
    /// Answer the account owner's own messages that start with one of the
    /// configured command prefixes. The prompt is everything after the prefix.
    Command { prefixes: Vec<String> },
    /// Answer any private plain-text message from another party; the prompt is
    /// the whole message text.
    Open,
}
