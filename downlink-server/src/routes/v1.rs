use axum::{
    Router,
    routing::{get, post},
};

use crate::app_state::AppState;
use crate::handlers::{
    exports::export_handler,
    nodes::{list_nodes_handler, register_node_handler},
    requests::{create_request_handler, get_request_handler},
};

/// Create all v1 API routes
pub fn create_v1_router(_state: AppState) -> Router<AppState> {
    Router::new()
        // Capture node registry
        .route(
            "/nodes",
            post(register_node_handler).get(list_nodes_handler),
        )
        // Tasking request intake and audit lookups
        .route("/requests", post(create_request_handler))
        .route("/requests/{id}", get(get_request_handler))
        // Artifact export bundles
        .route("/exports", post(export_handler))
}
