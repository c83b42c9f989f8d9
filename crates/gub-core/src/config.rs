use std::env;

use crate::{errors::Error, messaging::types::ReplyMode, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_PORT: u16 = 8000;

/// Typed configuration for the bot.
///
/// Everything comes from the process environment (plus an optional `.env`
/// file for local runs). Missing or unparsable required keys are fatal: the
/// process must not start listeners without credentials.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram user session
    pub api_id: i32,
    pub api_hash: String,
    pub session_string: String,

    // Gemini
    pub gemini_api_key: String,
    pub model_name: String,

    // Behavior
    pub reply_mode: ReplyMode,

    // Health endpoint
    pub port: u16,
}

impl Config {
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let api_id = env_str("API_ID")
            .and_then(non_empty)
            .ok_or_else(|| Error::Config("API_ID environment variable is required".to_string()))?
            .trim()
            .parse::<i32>()
            .map_err(|_| {
                Error::Config("API_ID must be a numeric Telegram application id".to_string())
            })?;

        let api_hash = require("API_HASH")?;
        let session_string = require("SESSION_STRING")?;
        let gemini_api_key = require("GEMINI_API_KEY")?;

        let model_name = env_str("GEMINI_MODEL_NAME")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let reply_mode = parse_reply_mode(
            env_str("REPLY_MODE").as_deref(),
            env_str("COMMAND_PREFIX_LIST").as_deref(),
        )?;

        let port = env_u16("PORT").unwrap_or(DEFAULT_PORT);

        Ok(Self {
            api_id,
            api_hash,
            session_string,
            gemini_api_key,
            model_name,
            reply_mode,
            port,
        })
    }
}

/// Parse the selection policy from `REPLY_MODE` / `COMMAND_PREFIX_LIST`.
///
/// `command` (the default) answers the account owner's own prefixed messages;
/// `open` answers any private text message from another party.
pub fn parse_reply_mode(mode: Option<&str>, prefixes: Option<&str>) -> Result<ReplyMode> {
    match mode.map(|m| m.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("command") => Ok(ReplyMode::Command {
            prefixes: parse_prefixes(prefixes),
        }),
        Some("open") => Ok(ReplyMode::Open),
        Some(other) => Err(Error::Config(format!(
            "REPLY_MODE must be \"command\" or \"open\", got {other:?}"
        ))),
    }
}

/// Whitespace-separated prefix list, default `.ai`.
pub fn parse_prefixes(v: Option<&str>) -> Vec<String> {
    let parsed: Vec<String> = v
        .unwrap_or_default()
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();
    if parsed.is_empty() {
        vec![".ai".to_string()]
    } else {
        parsed
    }
}

fn require(key: &str) -> Result<String> {
    env_str(key)
        .and_then(non_empty)
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u16(key: &str) -> Option<u16> {
    env_str(key).and_then(|s| s.trim().parse::<u16>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
