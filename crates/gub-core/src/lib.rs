//! Core domain + application logic for the Gemini userbot.
//!
//! This crate is intentionally framework-agnostic. Telegram / Gemini live
//! behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod model;
pub mod orchestrator;

pub use errors::{Error, Result};
