//! User-visible reply texts (markdown parse mode).

use crate::Error;

/// Interim text shown while the model call is in flight.
pub const THINKING: &str = "🧠 **Thinking...**";

pub fn usage_hint(prefix: &str) -> String {
    format!("❓ **Usage:** `{prefix} <question>`")
}

/// Final reply: the query echoed back, a separator, then the answer.
pub fn compose_answer(prompt: &str, answer: &str) -> String {
    format!("**Query:** `{prompt}`\n\n---\n\n{answer}")
}

pub fn compose_error(err: &Error) -> String {
    format!("🚫 AI Error: `{err}`")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_keeps_prompt_and_separator() {
        let text = compose_answer("why is the sky blue", "Rayleigh scattering.");
        assert!(text.contains("why is the sky blue"));
        assert!(text.contains("\n\n---\n\n"));
        assert!(text.ends_with("Rayleigh scattering."));
    }

    #[test]
    fn error_text_names_the_failure() {
        let text = compose_error(&Error::Generation("quota exceeded".to_string()));
        assert!(text.contains("Error"));
        assert!(text.contains("quota exceeded"));
    }
}
