use std::sync::Arc;

use tracing::{error, info};

use gub_core::{config::Config, orchestrator::Orchestrator};
use gub_gemini::GeminiClient;
use gub_web::WebState;

#[tokio::main]
async fn main() -> Result<(), gub_core::Error> {
    gub_core::logging::init("gub")?;

    // Fatal without credentials: never bind a listener.
    let cfg = Arc::new(Config::load()?);
    info!(model = %cfg.model_name, mode = ?cfg.reply_mode, "starting gemini userbot");

    let model = Arc::new(GeminiClient::new(
        cfg.gemini_api_key.clone(),
        cfg.model_name.clone(),
    ));

    let state = WebState::new(cfg.model_name.clone());

    // Bring the Telegram session up in the background; the health endpoint's
    // readiness must never block on messaging I/O.
    let bot_task = tokio::spawn(bring_up_bot(cfg.clone(), model, state.clone()));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(gub_core::Error::Io)?;
    info!(%addr, "health endpoint listening");

    axum::serve(listener, gub_web::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(gub_core::Error::Io)?;

    // No draining: an exchange mid-flight at shutdown is abandoned.
    bot_task.abort();
    info!("telegram client stopped");

    Ok(())
}

async fn bring_up_bot(cfg: Arc<Config>, model: Arc<GeminiClient>, state: WebState) {
    let messenger = match gub_telegram::runner::connect(&cfg).await {
        Ok(messenger) => Arc::new(messenger),
        Err(err) => {
            error!(%err, "telegram session failed to start; health stays \"not started\"");
            return;
        }
    };

    state.mark_bot_started();
    info!("telegram client started in background");

    let orchestrator = Arc::new(Orchestrator::new(
        messenger.clone(),
        model,
        cfg.reply_mode.clone(),
    ));

    if let Err(err) = gub_telegram::runner::run(messenger, orchestrator).await {
        error!(%err, "telegram update loop ended");
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to listen for shutdown signal");
    }
}
