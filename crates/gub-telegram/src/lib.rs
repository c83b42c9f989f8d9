//! Telegram adapter (grammers, MTProto user session).
//!
//! This crate implements the `gub-core` MessagingPort over a signed-in user
//! account and owns the update loop that feeds the orchestrator.

pub mod messenger;
pub mod runner;
pub mod session;

pub use messenger::TelegramMessenger;
