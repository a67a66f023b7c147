use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use speechops_core::models::{TranscriptionJob, TranscriptionJobRequest};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/transcription",
    tag = "transcription",
    request_body = TranscriptionJobRequest,
    responses(
        (status = 200, description = "Job accepted by the upstream", body = TranscriptionJob),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Upstream rejected the submission", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn submit_transcription(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<TranscriptionJobRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let job = state.speech.submit(&body).await?;
    tracing::info!(display_name = %body.display_name, "Transcription job submitted");
    Ok(Json(job))
}

#[utoipa::path(
    get,
    path = "/api/transcription",
    tag = "transcription",
    responses(
        (status = 200, description = "All jobs, upstream order preserved", body = [TranscriptionJob]),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn list_transcriptions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let jobs = state.speech.list().await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/api/transcription/{id}",
    tag = "transcription",
    params(("id" = String, Path, description = "Transcription job ID")),
    responses(
        (status = 200, description = "Job found", body = TranscriptionJob),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn get_transcription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let job = state.speech.get(&id).await?;
    Ok(Json(job))
}

#[utoipa::path(
    delete,
    path = "/api/transcription/{id}",
    tag = "transcription",
    params(("id" = String, Path, description = "Transcription job ID")),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_transcription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.speech.delete(&id).await?;
    tracing::info!(job_id = %id, "Transcription job deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/transcription/{id}/output",
    tag = "transcription",
    params(("id" = String, Path, description = "Transcription job ID")),
    responses(
        (status = 204, description = "Output files deleted"),
        (status = 404, description = "Job has no output files", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_transcription_output(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.speech.delete_output(&id).await?;
    tracing::info!(job_id = %id, "Transcription output deleted");
    Ok(StatusCode::NO_CONTENT)
}
