//! Session bring-up and the update loop that feeds the orchestrator.

use std::sync::Arc;

use grammers_client::{
    types::{Chat, Message},
    Client, InitParams, Update,
};
use tracing::{error, info};

use gub_core::{
    config::Config,
    domain::{ChatId, MessageId},
    errors::Error,
    messaging::types::Incoming,
    orchestrator::Orchestrator,
    Result,
};

use crate::{session::decode_session, TelegramMessenger};

/// Establish the MTProto session from config.
///
/// Fails if the session string is invalid or the account behind it is not
/// authorized; callers treat that as fatal for the bot (the health endpoint
/// keeps serving and reports "not started").
pub async fn connect(cfg: &Config) -> Result<TelegramMessenger> {
    let session = decode_session(&cfg.session_string)?;

    let client = Client::connect(grammers_client::Config {
        session,
        api_id: cfg.api_id,
        api_hash: cfg.api_hash.clone(),
        params: InitParams::default(),
    })
    .await
    .map_err(|e| Error::Session(format!("telegram connect failed: {e}")))?;

    let authorized = client
        .is_authorized()
        .await
        .map_err(|e| Error::Session(format!("authorization check failed: {e}")))?;
    if !authorized {
        return Err(Error::Session(
            "session string is not authorized; regenerate it with gub-session".to_string(),
        ));
    }

    info!("telegram session established");
    Ok(TelegramMessenger::new(client))
}

/// Drain updates until the connection ends.
///
/// Each qualifying message runs as an independent task; exchanges for
/// different messages are not serialized and may interleave, which is fine
/// because each one only ever touches its own placeholder.
pub async fn run(messenger: Arc<TelegramMessenger>, orchestrator: Arc<Orchestrator>) -> Result<()> {
    let client = messenger.client();
    loop {
        let update = client
            .next_update()
            .await
            .map_err(|e| Error::External(format!("telegram update stream failed: {e}")))?;

        let Update::NewMessage(message) = update else {
            continue;
        };

        messenger.remember_chat(&message.chat()).await;

        let incoming = normalize(&message);
        if !orchestrator.selects(&incoming) {
            continue;
        }

        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            if let Err(err) = orchestrator.handle(incoming).await {
                error!(%err, "exchange failed");
            }
        });
    }
}

fn normalize(message: &Message) -> Incoming {
    Incoming {
        chat_id: ChatId(message.chat().id()),
        message_id: MessageId(message.id()),
        text: message.text().to_string(),
        outgoing: message.outgoing(),
        private: matches!(message.chat(), Chat::User(_)),
        has_media: message.media().is_some(),
    }
}
