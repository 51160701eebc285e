use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use downlink_model::{DispatchRequest, NewDispatchRequest, NodeId, RequestId};

use crate::app_state::AppState;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub target_id: Option<String>,
    #[serde(default)]
    pub interval: i32,
    #[serde(default)]
    pub scheduled_time: Option<i64>,
    #[serde(default)]
    pub cycles: i32,
}

/// Insert a new tasking request into the ledger.
///
/// Intake validates the target against the registry; once a request is in
/// the ledger the orchestrator trusts its `target_id` as-is.
pub async fn create_request_handler(
    State(state): State<AppState>,
    Json(body): Json<CreateRequestBody>,
) -> AppResult<(StatusCode, Json<DispatchRequest>)> {
    let Some(target_id) = body.target_id else {
        return Err(AppError::bad_request("targetId is required"));
    };
    let target_id = NodeId::new(target_id)?;

    if !state.nodes.exists(&target_id).await? {
        return Err(AppError::not_found(format!(
            "capture node '{target_id}' is not registered"
        )));
    }

    let request = state
        .ledger
        .insert_request(NewDispatchRequest {
            target_id,
            interval: body.interval,
            scheduled_time: body.scheduled_time,
            cycles: body.cycles,
        })
        .await?;

    info!(request = %request.id, target = %request.target_id, "tasking request queued");
    Ok((StatusCode::CREATED, Json(request)))
}

/// Audit-trail lookup of one ledger row, claimed or not.
pub async fn get_request_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DispatchRequest>> {
    let request = state
        .ledger
        .get_request(RequestId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("no request with id {id}")))?;

    Ok(Json(request))
}
