//! Handler for task deliveries from the work queue.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use mangaka_core::payload::TaskPayload;
use mangaka_pipeline::RunReport;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/tasks/execute
///
/// Decodes the task payload and runs it to completion. The body is decoded
/// regardless of `Content-Type`, since queue deliveries do not always set it.
///
/// The run is spawned with a cancellation token guarded by this request:
/// if the request is abandoned (deadline elapsed, client gone) the token is
/// cancelled and the run stops at its current phase and reports the failure.
pub async fn execute_task(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<DataResponse<RunReport>>> {
    let payload: TaskPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid task payload: {e}")))?;

    tracing::info!(
        command = %payload.command,
        source_reference = %payload.source_reference,
        "Task received",
    );

    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();
    let orchestrator = Arc::clone(&state.orchestrator);
    let run = tokio::spawn(async move { orchestrator.execute(&payload, cancel).await });

    let result = run
        .await
        .map_err(|e| AppError::InternalError(format!("Pipeline task aborted: {e}")))?;
    guard.disarm();

    let report = result?;
    Ok(Json(DataResponse { data: report }))
}
