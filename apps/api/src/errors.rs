use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::layout::LayoutError;
use crate::render::pdf::EncodingError;
use crate::scraper::FetchError;
use crate::tailoring::TailoringError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant is reported with the same envelope, `{ "success": false, "error": ... }`,
/// and status 500: callers get no partial success.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to fetch job posting: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to tailor resume: {0}")]
    Tailoring(#[from] TailoringError),

    #[error("Invalid page layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("Failed to generate PDF: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                other.to_string()
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_layout_error_maps_to_uniform_500() {
        let error = AppError::from(LayoutError::NonPositive {
            field: "line_height",
            value: 0.0,
        });
        let (status, body) = body_json(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("line_height"));
    }

    #[tokio::test]
    async fn test_fetch_error_message_surfaces() {
        let error = AppError::from(FetchError::Timeout { seconds: 30 });
        let (_, body) = body_json(error).await;
        assert_eq!(
            body["error"],
            "Failed to fetch job posting: navigation timed out after 30s"
        );
    }

    #[tokio::test]
    async fn test_internal_error_details_hidden() {
        let error = AppError::Internal(anyhow::anyhow!("blocking task panicked at secret.rs"));
        let (status, body) = body_json(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal server error occurred");
    }
}
