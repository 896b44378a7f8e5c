mod config;
mod errors;
mod layout;
mod llm_client;
mod render;
mod routes;
mod scraper;
mod state;
mod tailoring;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::PageGeometry;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scraper::chromium::ChromiumLauncher;
use crate::scraper::JobFetcher;
use crate::state::AppState;
use crate::tailoring::ClaudeTailor;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client and the tailor on top of it
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let tailor = Arc::new(ClaudeTailor::new(llm));

    // One headless browser per fetch; nothing is launched until a request needs it
    let launcher = Arc::new(ChromiumLauncher::new(
        config.chrome_executable.clone(),
        config.fetch_timeout,
    ));
    let fetcher = JobFetcher::new(launcher, config.fetch_timeout);
    info!(
        "Job fetcher ready (timeout: {}s)",
        config.fetch_timeout.as_secs()
    );

    let page_geometry = PageGeometry::a4(config.pdf_font);
    info!(
        "Page geometry: {:?} {}pt, {}x{}mm",
        page_geometry.font,
        page_geometry.font_size_pt,
        page_geometry.page_width,
        page_geometry.page_height
    );

    // Build app state
    let state = AppState {
        fetcher,
        tailor,
        page_geometry,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
