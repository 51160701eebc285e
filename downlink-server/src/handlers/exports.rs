use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;

use downlink_model::ExportFilter;

use crate::app_state::AppState;
use crate::errors::{AppError, AppResult};
use crate::export::bundle;

/// Query the artifact store and stream the matches as one zip archive.
///
/// All filter predicates are optional and conjunctive; ranges are
/// inclusive on both ends. Zero matches is a 404 and no bundle is built.
pub async fn export_handler(
    State(state): State<AppState>,
    Json(filter): Json<ExportFilter>,
) -> AppResult<Response> {
    filter.validate()?;

    let artifacts = state.artifacts.query(&filter).await?;
    if artifacts.is_empty() {
        return Err(AppError::not_found("no matching artifacts"));
    }

    info!(matches = artifacts.len(), "export query matched");

    // Bundling touches the filesystem and deflates; keep it off the
    // async workers.
    let bytes = tokio::task::spawn_blocking(move || bundle::zip_artifacts(&artifacts))
        .await
        .map_err(|err| AppError::internal(format!("bundling task failed: {err}")))??;

    let headers = [
        (header::CONTENT_TYPE, "application/zip"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"artifacts.zip\"",
        ),
    ];

    Ok((StatusCode::OK, headers, bytes).into_response())
}
