//! Hair Quiz · Recommendation Wizard Backend
//!
//! - Axum HTTP + WebSocket API driving a linear hair-care quiz
//! - Optional external recommendation backend (via environment variables)
//! - Static quiz page fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                         : u16 (default 3000)
//!   RECOMMENDER_BASE_URL         : enables the recommendation backend if present
//!   RECOMMENDER_ENDPOINT         : default "/diagnose"
//!   RECOMMENDER_FETCH_QUESTIONS  : "1"/"true" to load questions from the backend
//!   RECOMMENDER_TIMEOUT_SECS     : request timeout; unset means none
//!   QUIZ_IDLE_SECS               : drop quizzes untouched this long (default 1800)
//!   QUIZ_CONFIG_PATH             : path to TOML config (questions + field names)
//!   LOG_LEVEL                    : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT                   : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod answers;
mod catalog;
mod widgets;
mod domain;
mod fallback;
mod quiz;
mod presentation;
mod config;
mod recommender;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Catalog, recommendation client and the empty quiz registry.
  let state = Arc::new(AppState::new().await);

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "hair_quiz", %addr, questions = state.catalog.len(), "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
