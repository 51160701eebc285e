//! # Downlink Node
//!
//! Capture node simulator: the remote half of the Downlink tasking
//! platform. On a capture command it acquires one image, persists it
//! locally, and records it in an in-memory manifest; the orchestrator
//! later drains that manifest and pulls the bytes from the static content
//! endpoint.
//!
//! Produced files accumulate in the image directory with no expiry — a
//! known limitation of the simulator, not something this process cleans up
//! behind the collector's back.

pub mod errors;
pub mod handlers;
pub mod manifest;
pub mod source;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

/// Build the node's router: capture, drain, and static image bytes.
pub fn create_router(state: AppState) -> Router {
    let images = ServeDir::new(&state.image_dir);

    Router::new()
        .route("/capture", post(handlers::capture_handler))
        .route("/manifest", get(handlers::drain_manifest_handler))
        .nest_service("/images", images)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
