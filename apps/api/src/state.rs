use std::sync::Arc;

use crate::layout::PageGeometry;
use crate::scraper::JobFetcher;
use crate::tailoring::ResumeTailor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: JobFetcher,
    /// Pluggable tailor. Default: ClaudeTailor; tests inject a stub.
    pub tailor: Arc<dyn ResumeTailor>,
    /// Page geometry for PDF rendering. A4 with the configured font.
    pub page_geometry: PageGeometry,
}
