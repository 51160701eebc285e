//! # Downlink Server
//!
//! Intake and export HTTP API for the Downlink tasking platform.
//!
//! ## Overview
//!
//! The server owns the client-facing surfaces around the durable stores:
//!
//! - **Node registry**: capture nodes are registered here before they can
//!   be tasked
//! - **Request intake**: validated inserts into the append-mostly ledger
//!   the orchestrator polls
//! - **Export**: filtered artifact queries bundled into zip archives
//!
//! The orchestration loop itself lives in `downlink-core` and runs as its
//! own process; this server never mutates a request's `seen` flag.

pub mod app_state;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod routes;

pub use app_state::AppState;
pub use errors::{AppError, AppResult};

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Assemble the full application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_api_router(state.clone()))
        .route("/health", axum::routing::get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
