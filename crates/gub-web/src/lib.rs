//! Liveness endpoint for hosting-platform health checks.
//!
//! `GET /` and `GET /health` report whether the messaging client handle was
//! constructed. This is deliberately a weak signal: it says nothing about the
//! session actually being connected right now.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// State shared with the health routes.
#[derive(Clone)]
pub struct WebState {
    model: String,
    bot_started: Arc<AtomicBool>,
}

impl WebState {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            bot_started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flip the liveness signal once the messaging client handle exists.
    pub fn mark_bot_started(&self) {
        self.bot_started.store(true, Ordering::SeqCst);
    }

    fn bot_status(&self) -> &'static str {
        if self.bot_started.load(Ordering::SeqCst) {
            "running"
        } else {
            "not started"
        }
    }
}

#[derive(Serialize)]
pub struct Health {
    pub status: String,
    pub bot_status: String,
    pub model: String,
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .with_state(state)
}

async fn health(State(state): State<WebState>) -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        bot_status: state.bot_status().to_string(),
        model: state.model.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_not_started_until_marked() {
        let state = WebState::new("gemini-2.5-flash");

        let body = health(State(state.clone())).await.0;
        assert_eq!(body.status, "ok");
        assert_eq!(body.bot_status, "not started");
        assert_eq!(body.model, "gemini-2.5-flash");

        state.mark_bot_started();
        let body = health(State(state)).await.0;
        assert_eq!(body.bot_status, "running");
    }
}
