//! Reply orchestrator: one incoming-message-to-reply cycle (an "exchange").
//!
//! Each qualifying message runs one exchange: extract the prompt, present a
//! placeholder, call the model, edit the placeholder to the answer or an error
//! text. Exchanges are independent; nothing is retained afterwards.

use std::sync::Arc;

use tracing::error;

use crate::{
    domain::MessageRef,
    formatting::{compose_answer, compose_error, usage_hint, THINKING},
    messaging::{
        port::MessagingPort,
        types::{Incoming, ReplyMode},
    },
    model::GenerativeModel,
    Result,
};

/// What the active selection policy makes of an incoming message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Not for us; no action at all.
    Skip,
    /// Command mode, bare prefix with no question: reply with a usage hint in
    /// place of the original message, no placeholder.
    Usage { hint: String },
    Prompt(String),
}

/// Apply the selection policy to a normalized incoming message.
pub fn select(mode: &ReplyMode, msg: &Incoming) -> Selection {
    match mode {
        ReplyMode::Command { prefixes } => {
            if !msg.outgoing || msg.has_media || msg.text.is_empty() {
                return Selection::Skip;
            }
            let mut split = msg.text.splitn(2, char::is_whitespace);
            let first = split.next().unwrap_or_default();
            if !prefixes.iter().any(|p| p == first) {
                return Selection::Skip;
            }
            match split.next().map(str::trim).filter(|rest| !rest.is_empty()) {
                Some(rest) => Selection::Prompt(rest.to_string()),
                None => Selection::Usage {
                    hint: usage_hint(prefixes.first().map(String::as_str).unwrap_or(".ai")),
                },
            }
        }
        ReplyMode::Open => {
            if msg.outgoing || !msg.private || msg.has_media || msg.text.is_empty() {
                Selection::Skip
            } else {
                Selection::Prompt(msg.text.clone())
            }
        }
    }
}

pub struct Orchestrator {
    messenger: Arc<dyn MessagingPort>,
    model: Arc<dyn GenerativeModel>,
    mode: ReplyMode,
}

impl Orchestrator {
    pub fn new(
        messenger: Arc<dyn MessagingPort>,
        model: Arc<dyn GenerativeModel>,
        mode: ReplyMode,
    ) -> Self {
        Self {
            messenger,
            model,
            mode,
        }
    }

    pub fn mode(&self) -> &ReplyMode {
        &self.mode
    }

    /// The subscription predicate: does the active mode select this message?
    pub fn selects(&self, msg: &Incoming) -> bool {
        select(&self.mode, msg) != Selection::Skip
    }

    /// Run one exchange end to end. Does nothing for messages the active mode
    /// does not select. A placeholder, once created, is always edited to either
    /// an answer or an error description before this returns `Ok`.
    pub async fn handle(&self, msg: Incoming) -> Result<()> {
        let prompt = match select(&self.mode, &msg) {
            Selection::Skip => return Ok(()),
            Selection::Usage { hint } => {
                self.messenger.edit(msg.reference(), &hint).await?;
                return Ok(());
            }
            Selection::Prompt(prompt) => prompt,
        };

        // The model call may take several seconds; editing a pre-sent
        // placeholder gives immediate feedback without a second round trip.
        let placeholder = self.present_placeholder(&msg).await?;

        let text = match self.model.generate(&prompt).await {
            Ok(answer) => compose_answer(&prompt, &answer),
            Err(err) => {
                error!(%err, "generation failed");
                compose_error(&err)
            }
        };

        self.messenger.edit(placeholder, &text).await
    }

    /// Command mode edits the original message in place; open mode sends a new
    /// reply to it.
    async fn present_placeholder(&self, msg: &Incoming) -> Result<MessageRef> {
        match self.mode {
            ReplyMode::Command { .. } => {
                let reference = msg.reference();
                self.messenger.edit(reference, THINKING).await?;
                Ok(reference)
            }
            ReplyMode::Open => {
                self.messenger
                    .send(msg.chat_id, THINKING, Some(msg.message_id))
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        domain::{ChatId, MessageId},
        Error,
    };

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Call {
        Send {
            chat_id: ChatId,
            text: String,
            reply_to: Option<MessageId>,
        },
        Edit {
            msg: MessageRef,
            text: String,
        },
    }

    #[derive(Default)]
    struct MockMessenger {
        calls: Mutex<Vec<Call>>,
    }

    impl MockMessenger {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessagingPort for MockMessenger {
        async fn send(
            &self,
            chat_id: ChatId,
            text: &str,
            reply_to: Option<MessageId>,
        ) -> Result<MessageRef> {
            self.calls.lock().unwrap().push(Call::Send {
                chat_id,
                text: text.to_string(),
                reply_to,
            });
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(777),
            })
        }

        async fn edit(&self, msg: MessageRef, text: &str) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Edit {
                msg,
                text: text.to_string(),
            });
            Ok(())
        }
    }

    struct MockModel {
        reply: Result<String>,
    }

    impl MockModel {
        fn ok(answer: &str) -> Self {
            Self {
                reply: Ok(answer.to_string()),
            }
        }

        fn failing(detail: &str) -> Self {
            Self {
                reply: Err(Error::Generation(detail.to_string())),
            }
        }
    }

    #[async_trait]
    impl GenerativeModel for MockModel {
        fn model_name(&self) -> &str {
            "mock"
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(Error::Generation(detail)) => Err(Error::Generation(detail.clone())),
                Err(_) => unreachable!(),
            }
        }
    }

    fn command_mode() -> ReplyMode {
        ReplyMode::Command {
            prefixes: vec![".ai".to_string(), "/ai".to_string()],
        }
    }

    fn own_message(text: &str) -> Incoming {
        Incoming {
            chat_id: ChatId(10),
            message_id: MessageId(42),
            text: text.to_string(),
            outgoing: true,
            private: false,
            has_media: false,
        }
    }

    fn private_message(text: &str) -> Incoming {
        Incoming {
            chat_id: ChatId(20),
            message_id: MessageId(7),
            text: text.to_string(),
            outgoing: false,
            private: true,
            has_media: false,
        }
    }

    fn orchestrator(mode: ReplyMode, model: MockModel) -> (Arc<MockMessenger>, Orchestrator) {
        let messenger = Arc::new(MockMessenger::default());
        let orchestrator = Orchestrator::new(messenger.clone(), Arc::new(model), mode);
        (messenger, orchestrator)
    }

    #[test]
    fn command_mode_extracts_trimmed_prompt() {
        let msg = own_message(".ai   what is rust?  ");
        assert_eq!(
            select(&command_mode(), &msg),
            Selection::Prompt("what is rust?".to_string())
        );
    }

    #[test]
    fn command_mode_requires_whole_first_token() {
        // ".aix" must not match the ".ai" prefix.
        let msg = own_message(".aix hello");
        assert_eq!(select(&command_mode(), &msg), Selection::Skip);
    }

    #[test]
    fn command_mode_ignores_other_senders() {
        let mut msg = own_message(".ai hello");
        msg.outgoing = false;
        assert_eq!(select(&command_mode(), &msg), Selection::Skip);
    }

    #[test]
    fn bare_prefix_yields_usage_hint() {
        assert!(matches!(
            select(&command_mode(), &own_message(".ai")),
            Selection::Usage { .. }
        ));
        assert!(matches!(
            select(&command_mode(), &own_message(".ai   ")),
            Selection::Usage { .. }
        ));
    }

    #[test]
    fn open_mode_takes_text_verbatim() {
        let msg = private_message("hello there");
        assert_eq!(
            select(&ReplyMode::Open, &msg),
            Selection::Prompt("hello there".to_string())
        );
    }

    #[test]
    fn open_mode_skips_own_group_and_media_messages() {
        let mut own = private_message("hi");
        own.outgoing = true;
        assert_eq!(select(&ReplyMode::Open, &own), Selection::Skip);

        let mut group = private_message("hi");
        group.private = false;
        assert_eq!(select(&ReplyMode::Open, &group), Selection::Skip);

        let mut media = private_message("look at this");
        media.has_media = true;
        assert_eq!(select(&ReplyMode::Open, &media), Selection::Skip);

        assert_eq!(select(&ReplyMode::Open, &private_message("")), Selection::Skip);
    }

    #[tokio::test]
    async fn command_exchange_edits_placeholder_then_answer() {
        let (messenger, orchestrator) = orchestrator(command_mode(), MockModel::ok("42."));
        let msg = own_message(".ai meaning of life");
        orchestrator.handle(msg.clone()).await.unwrap();

        let calls = messenger.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            Call::Edit {
                msg: msg.reference(),
                text: THINKING.to_string(),
            }
        );
        let Call::Edit { msg: edited, text } = &calls[1] else {
            panic!("expected final edit, got {:?}", calls[1]);
        };
        assert_eq!(*edited, msg.reference());
        assert!(text.contains("meaning of life"));
        assert!(text.contains("\n\n---\n\n"));
        assert!(text.contains("42."));
    }

    #[tokio::test]
    async fn open_exchange_replies_then_edits_its_own_placeholder() {
        let (messenger, orchestrator) = orchestrator(ReplyMode::Open, MockModel::ok("hi!"));
        let msg = private_message("hello");
        orchestrator.handle(msg.clone()).await.unwrap();

        let calls = messenger.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            Call::Send {
                chat_id: msg.chat_id,
                text: THINKING.to_string(),
                reply_to: Some(msg.message_id),
            }
        );
        let Call::Edit { msg: edited, text } = &calls[1] else {
            panic!("expected final edit, got {:?}", calls[1]);
        };
        // The placeholder reply, not the incoming message, gets edited.
        assert_eq!(edited.message_id, MessageId(777));
        assert!(text.contains("hi!"));
    }

    #[tokio::test]
    async fn generation_failure_resolves_placeholder_with_error_text() {
        let (messenger, orchestrator) =
            orchestrator(command_mode(), MockModel::failing("quota exceeded"));
        orchestrator.handle(own_message(".ai hi")).await.unwrap();

        let calls = messenger.calls();
        assert_eq!(calls.len(), 2);
        let Call::Edit { text, .. } = &calls[1] else {
            panic!("expected final edit, got {:?}", calls[1]);
        };
        assert!(text.contains("Error"));
        assert!(text.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn bare_prefix_sends_usage_and_no_placeholder() {
        let (messenger, orchestrator) = orchestrator(command_mode(), MockModel::ok("unused"));
        orchestrator.handle(own_message(".ai")).await.unwrap();

        let calls = messenger.calls();
        assert_eq!(calls.len(), 1);
        let Call::Edit { text, .. } = &calls[0] else {
            panic!("expected usage edit, got {:?}", calls[0]);
        };
        assert!(text.contains("Usage"));
        assert!(text.contains(".ai"));
    }

    #[tokio::test]
    async fn non_matching_message_touches_nothing() {
        let (messenger, orchestrator) = orchestrator(command_mode(), MockModel::ok("unused"));
        assert!(!orchestrator.selects(&own_message("just a note")));
        orchestrator.handle(own_message("just a note")).await.unwrap();
        assert!(messenger.calls().is_empty());
    }
}
