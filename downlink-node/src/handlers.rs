use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::{info, warn};

use downlink_model::{DispatchCommand, ManifestEntry};

use crate::errors::{NodeError, NodeResult};
use crate::state::AppState;

/// Take one photo: acquire an image, persist it under the deterministic
/// capture filename, and append the manifest entry before responding.
pub async fn capture_handler(
    State(state): State<AppState>,
    Json(command): Json<DispatchCommand>,
) -> NodeResult<(StatusCode, Json<Value>)> {
    if command.target_id != state.target_id {
        // The orchestrator routes by configuration, not by asking us; a
        // mismatch means its fleet table disagrees with ours.
        warn!(
            addressed = %command.target_id,
            local = %state.target_id,
            "capture command addressed to another node, taking it anyway"
        );
    }

    let filename = command.filename();
    info!(request = %command.request_id, %filename, "capture tasked");

    let data = state
        .source
        .acquire()
        .await
        .map_err(|err| NodeError::internal(format!("image acquisition failed: {err}")))?;

    let path = state.image_dir.join(&filename);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|err| NodeError::internal(format!("failed to persist {filename}: {err}")))?;

    let entry = ManifestEntry {
        request_id: command.request_id,
        target_id: command.target_id,
        filename: filename.clone(),
        updated_at: command.updated_at,
    };
    state
        .manifest
        .append(entry)
        .map_err(|err| NodeError::overloaded(err.to_string()))?;

    Ok((StatusCode::CREATED, Json(json!({ "filename": filename }))))
}

/// Return and clear the manifest in one atomic step; an entry appended
/// concurrently with this call lands in exactly one drain.
pub async fn drain_manifest_handler(State(state): State<AppState>) -> Json<Vec<ManifestEntry>> {
    let entries = state.manifest.drain();
    if !entries.is_empty() {
        info!(entries = entries.len(), "manifest drained");
    }
    Json(entries)
}
