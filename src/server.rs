//! HTTP server initialization.
//!
//! [`serve`] wires up the database, the summarizer backend, and the API router into a
//! running server with graceful shutdown on Ctrl-C.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::{self, AppState};
use crate::config::QuicknoteConfig;
use crate::db;
use crate::notes::NoteStore;
use crate::summarizer;

/// Shared setup: open DB and create the summarizer. Config values are injected here
/// so the core components never read configuration themselves.
pub fn build_state(config: &QuicknoteConfig) -> Result<AppState> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let summarizer = summarizer::create_summarizer(&config.summarizer)?;
    tracing::info!(backend = summarizer.backend_name(), "summarizer ready");

    Ok(AppState::new(
        NoteStore::new(conn),
        summarizer,
        Duration::from_secs(config.server.request_timeout_secs),
        config.server.max_text_chars,
    ))
}

/// Start the HTTP server and run until Ctrl-C.
pub async fn serve(config: QuicknoteConfig) -> Result<()> {
    let bind_addr = config.bind_addr();
    tracing::info!(addr = %bind_addr, "starting QuickNote service");

    let state = build_state(&config)?;
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "listening at http://{bind_addr}/api");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutting down HTTP server"),
        Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
    }
}
