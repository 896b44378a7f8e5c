//! Axum route handler for resume tailoring.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorRequest {
    pub job_url: String,
    pub master_resume_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorResponse {
    pub success: bool,
    pub tailored_resume: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/tailor-resume
///
/// Fetches the posting at `jobUrl`, then rewrites `masterResumeText` toward it.
/// The two steps run in sequence; a failure in either is the whole request's failure.
pub async fn handle_tailor_resume(
    State(state): State<AppState>,
    payload: Result<Json<TailorRequest>, JsonRejection>,
) -> Result<Json<TailorResponse>, AppError> {
    let Json(request) = payload?;
    if request.master_resume_text.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "masterResumeText cannot be empty".to_string(),
        ));
    }

    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        job_url = %request.job_url,
        resume_chars = request.master_resume_text.chars().count(),
        "Tailoring resume"
    );

    let job_description = state.fetcher.fetch(&request.job_url).await?;
    let tailored_resume = state
        .tailor
        .tailor(&request.master_resume_text, &job_description)
        .await?;

    info!(
        %request_id,
        job_chars = job_description.chars().count(),
        tailored_chars = tailored_resume.chars().count(),
        "Resume tailored"
    );

    Ok(Json(TailorResponse {
        success: true,
        tailored_resume,
    }))
}
