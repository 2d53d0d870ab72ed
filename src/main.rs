//! Lexical Gap · Cloze Exercise Backend
//!
//! - Axum HTTP + WebSocket API (one exercise session per WebSocket)
//! - Optional OpenAI integration for topics, exercises and reference translations
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   OPENAI_API_KEY       : enables generation if present
//!   OPENAI_BASE_URL      : default "https://api.openai.com/v1"
//!   OPENAI_FAST_MODEL    : default "gpt-4o-mini" (topics, translations)
//!   OPENAI_STRONG_MODEL  : default "gpt-4o" (exercises)
//!   OPENAI_TIMEOUT_SECS  : default 60
//!   PROMPTS_CONFIG_PATH  : path to TOML prompt overrides
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod placeholder;
mod scoring;
mod requests;
mod backend;
mod openai;
mod content;
mod session;
mod state;
mod protocol;
mod logic;
mod routes;
#[cfg(test)]
mod testing;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Settings;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let settings = Settings::from_env();

  // Shared state: content service when a key is configured, nothing otherwise.
  let state = Arc::new(AppState::new(&settings));

  let app = build_router(state);

  let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "lexical_gap", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "lexical_gap", error = %e, "Failed to listen for shutdown signal");
    return;
  }
  info!(target: "lexical_gap", "Shutdown signal received");
}
