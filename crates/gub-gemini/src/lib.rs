//! Gemini adapter (text generation over the REST API).
//!
//! Implements the `gub-core` GenerativeModel port against the
//! `models/{model}:generateContent` endpoint.

use async_trait::async_trait;

use gub_core::{errors::Error, model::GenerativeModel, Result};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone, Debug)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("reqwest client build");
        Self {
            api_key: api_key.into(),
            model: model.into(),
            http,
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{API_BASE}/models/{}:generateContent", self.model);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("gemini request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "gemini request failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::Generation(format!("gemini json error: {e}")))?;

        extract_text(&v)
    }
}

/// Pull the generated text out of a `generateContent` response: the parts of
/// the first candidate, concatenated.
fn extract_text(v: &serde_json::Value) -> Result<String> {
    let parts = v
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| Error::Generation("gemini response has no candidates".to_string()))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        return Err(Error::Generation(
            "gemini returned empty text".to_string(),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_candidate_parts() {
        let v = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "Hello, " }, { "text": "world." }],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_text(&v).unwrap(), "Hello, world.");
    }

    #[test]
    fn missing_candidates_is_a_generation_error() {
        let v = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = extract_text(&v).unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn empty_text_is_a_generation_error() {
        let v = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "  " }] } }]
        });
        assert!(extract_text(&v).is_err());
    }
}
