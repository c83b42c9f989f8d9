//! Portable session strings: base64 of a saved grammers session.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use grammers_session::Session;

use gub_core::{errors::Error, Result};

/// Decode the `SESSION_STRING` environment value into a session.
pub fn decode_session(session_string: &str) -> Result<Session> {
    let bytes = STANDARD
        .decode(session_string.trim())
        .map_err(|e| Error::Session(format!("SESSION_STRING is not valid base64: {e}")))?;

    Session::load(&bytes)
        .map_err(|e| Error::Session(format!("SESSION_STRING does not hold a session: {e:?}")))
}

/// Encode a session into the portable string accepted by [`decode_session`].
pub fn encode_session(session: &Session) -> String {
    STANDARD.encode(session.save())
}
