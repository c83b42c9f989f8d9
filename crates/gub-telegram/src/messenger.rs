use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use grammers_client::{types::Chat, Client, InputMessage, InvocationError};
use grammers_session::PackedChat;
use tokio::{sync::Mutex, time::sleep};
use tracing::warn;

use gub_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

/// MessagingPort over a signed-in Telegram user session.
///
/// grammers addresses chats with packed handles (id + access hash), so the
/// messenger remembers the handle of every chat it has seen an update from and
/// resolves send/edit targets from that cache.
pub struct TelegramMessenger {
    client: Client,
    chats: Mutex<HashMap<i64, PackedChat>>,
}

impl TelegramMessenger {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            chats: Mutex::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Remember the packed handle for a chat so later calls can address it.
    pub async fn remember_chat(&self, chat: &Chat) {
        self.chats.lock().await.insert(chat.id(), chat.pack());
    }

    async fn packed(&self, chat_id: ChatId) -> Result<PackedChat> {
        self.chats
            .lock()
            .await
            .get(&chat_id.0)
            .copied()
            .ok_or_else(|| Error::External(format!("unknown chat {}", chat_id.0)))
    }

    fn map_err(e: InvocationError) -> Error {
        match &e {
            InvocationError::Rpc(rpc) if rpc.name == "FLOOD_WAIT" => Error::RateLimited {
                retry_after: Duration::from_secs(u64::from(rpc.value.unwrap_or(0))),
            },
            _ => Error::External(format!("telegram error: {e}")),
        }
    }
}

/// Retry an operation exactly once when the platform reports a flood wait,
/// sleeping the signaled duration first. A second flood wait propagates.
pub async fn with_flood_retry<T, Fut>(mut op: impl FnMut() -> Fut) -> Result<T>
where
    Fut: std::future::Future<Output = Result<T>>,
{
    const MAX_RETRIES: usize = 1;
    let mut attempts = 0usize;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(Error::RateLimited { retry_after }) if attempts < MAX_RETRIES => {
                attempts += 1;
                warn!(wait_secs = retry_after.as_secs(), "flood wait, retrying once");
                sleep(retry_after).await;
            }
            Err(other) => return Err(other),
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageRef> {
        let chat = self.packed(chat_id).await?;
        let sent = with_flood_retry(|| {
            let input = InputMessage::markdown(text).reply_to(reply_to.map(|m| m.0));
            async move {
                self.client
                    .send_message(chat, input)
                    .await
                    .map_err(Self::map_err)
            }
        })
        .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(sent.id()),
        })
    }

    async fn edit(&self, msg: MessageRef, text: &str) -> Result<()> {
        let chat = self.packed(msg.chat_id).await?;
        with_flood_retry(|| {
            let input = InputMessage::markdown(text);
            async move {
                self.client
                    .edit_message(chat, msg.message_id.0, input)
                    .await
                    .map_err(Self::map_err)
            }
        })
        .await
    }
}
