pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::render::handlers::handle_generate_pdf;
use crate::state::AppState;
use crate::tailoring::handlers::handle_tailor_resume;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/api/tailor-resume", post(handle_tailor_resume))
        .route("/api/generate-pdf", post(handle_generate_pdf))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::layout::PageGeometry;
    use crate::scraper::{BrowserLauncher, BrowserSession, FetchError, JobFetcher};
    use crate::tailoring::{ResumeTailor, TailoringError};

    const JOB_TEXT: &str = "Backend Engineer\nRust, PostgreSQL, Kubernetes";

    struct StubLauncher {
        fail_navigation: bool,
        closes: Arc<AtomicUsize>,
    }

    struct StubSession {
        fail_navigation: bool,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BrowserLauncher for StubLauncher {
        async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
            Ok(Box::new(StubSession {
                fail_navigation: self.fail_navigation,
                closes: self.closes.clone(),
            }))
        }
    }

    #[async_trait]
    impl BrowserSession for StubSession {
        async fn rendered_text(&mut self, _url: &str, _ua: &str) -> Result<String, FetchError> {
            if self.fail_navigation {
                Err(FetchError::Navigation("net::ERR_CONNECTION_REFUSED".to_string()))
            } else {
                Ok(JOB_TEXT.to_string())
            }
        }

        async fn close(&mut self) -> Result<(), FetchError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Echoes its inputs so tests can see both reached the tailor.
    struct EchoTailor;

    #[async_trait]
    impl ResumeTailor for EchoTailor {
        async fn tailor(&self, resume: &str, job: &str) -> Result<String, TailoringError> {
            Ok(format!("{resume}\n-- tailored for: {}", job.lines().next().unwrap_or("")))
        }
    }

    struct BlankTailor;

    #[async_trait]
    impl ResumeTailor for BlankTailor {
        async fn tailor(&self, _resume: &str, _job: &str) -> Result<String, TailoringError> {
            Err(TailoringError::MalformedResponse(
                "response text was empty".to_string(),
            ))
        }
    }

    fn app(
        fail_navigation: bool,
        tailor: Arc<dyn ResumeTailor>,
    ) -> (Router, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let launcher = Arc::new(StubLauncher {
            fail_navigation,
            closes: closes.clone(),
        });
        let state = AppState {
            fetcher: JobFetcher::new(launcher, Duration::from_secs(5)),
            tailor,
            page_geometry: PageGeometry::default(),
        };
        (build_router(state), closes)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_reports_liveness() {
        let (app, _) = app(false, Arc::new(EchoTailor));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Resume backend is running!");
    }

    #[tokio::test]
    async fn test_health_reports_version() {
        let (app, _) = app(false, Arc::new(EchoTailor));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_tailor_resume_success() {
        let (app, closes) = app(false, Arc::new(EchoTailor));
        let response = app
            .oneshot(post_json(
                "/api/tailor-resume",
                json!({
                    "jobUrl": "https://jobs.example.com/42",
                    "masterResumeText": "Jane Doe\n- Built payment APIs"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(
            body["tailoredResume"],
            "Jane Doe\n- Built payment APIs\n-- tailored for: Backend Engineer"
        );
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tailor_resume_fetch_failure_is_uniform_500() {
        let (app, closes) = app(true, Arc::new(EchoTailor));
        let response = app
            .oneshot(post_json(
                "/api/tailor-resume",
                json!({
                    "jobUrl": "https://jobs.example.com/42",
                    "masterResumeText": "Jane Doe"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("ERR_CONNECTION_REFUSED"));
        // Browser closed before the error response was produced.
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tailor_resume_model_failure_is_uniform_500() {
        let (app, _) = app(false, Arc::new(BlankTailor));
        let response = app
            .oneshot(post_json(
                "/api/tailor-resume",
                json!({
                    "jobUrl": "https://jobs.example.com/42",
                    "masterResumeText": "Jane Doe"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body.get("tailoredResume").is_none());
    }

    #[tokio::test]
    async fn test_tailor_resume_rejects_blank_resume_without_fetching() {
        let (app, closes) = app(false, Arc::new(EchoTailor));
        let response = app
            .oneshot(post_json(
                "/api/tailor-resume",
                json!({ "jobUrl": "https://jobs.example.com/42", "masterResumeText": "  " }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["success"], false);
        assert_eq!(closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tailor_resume_missing_field_is_uniform_500() {
        let (app, _) = app(false, Arc::new(EchoTailor));
        let response = app
            .oneshot(post_json(
                "/api/tailor-resume",
                json!({ "jobUrl": "https://jobs.example.com/42" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_generate_pdf_returns_attachment() {
        let (app, _) = app(false, Arc::new(EchoTailor));
        let response = app
            .oneshot(post_json(
                "/api/generate-pdf",
                json!({ "resumeText": "Jane Doe\n\nExperienced engineer." }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=tailored-resume.pdf"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_generate_pdf_malformed_json_is_uniform_500() {
        let (app, _) = app(false, Arc::new(EchoTailor));
        let request = Request::builder()
            .method("POST")
            .uri("/api/generate-pdf")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"resumeText\": "))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["success"], false);
    }
}
