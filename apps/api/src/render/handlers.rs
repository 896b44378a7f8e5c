//! Axum route handler for PDF generation.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::layout::{page_count, paginate};
use crate::render::pdf::encode_pdf;
use crate::state::AppState;

pub const PDF_FILENAME: &str = "tailored-resume.pdf";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePdfRequest {
    pub resume_text: String,
}

/// POST /api/generate-pdf
///
/// Lays the resume text out on A4 pages and returns the PDF as an attachment.
/// Layout and encoding are CPU-bound, so both run on the blocking pool.
pub async fn handle_generate_pdf(
    State(state): State<AppState>,
    payload: Result<Json<GeneratePdfRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let geometry = state.page_geometry.clone();
    let text_chars = request.resume_text.chars().count();

    let (pages, pdf) = tokio::task::spawn_blocking(move || -> Result<_, AppError> {
        let instructions = paginate(&request.resume_text, &geometry)?;
        let pdf = encode_pdf(&instructions, &geometry)?;
        Ok((page_count(&instructions), pdf))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF render: {e}")))??;

    info!(
        text_chars,
        pages,
        bytes = pdf.len(),
        "Generated resume PDF"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={PDF_FILENAME}"),
            ),
        ],
        Bytes::from(pdf),
    )
        .into_response())
}
