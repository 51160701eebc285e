use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::info;

use downlink_model::{CaptureNodeRecord, NodeId};

use crate::app_state::AppState;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterNodeBody {
    pub id: Option<String>,
    pub client: Option<String>,
}

/// Register a capture node identity so requests may target it.
pub async fn register_node_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterNodeBody>,
) -> AppResult<(StatusCode, Json<CaptureNodeRecord>)> {
    let (Some(id), Some(client)) = (body.id, body.client) else {
        return Err(AppError::bad_request("id and client are required"));
    };
    if client.is_empty() {
        return Err(AppError::bad_request("client must not be empty"));
    }

    let id = NodeId::new(id)?;
    let record = state.nodes.register(&id, &client).await?;

    info!(node = %record.id, client = %record.client, "capture node registered");
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_nodes_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CaptureNodeRecord>>> {
    Ok(Json(state.nodes.list().await?))
}
