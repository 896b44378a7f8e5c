//! Headless Chromium implementation of the browser seam (via `chromiumoxide`).

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::scraper::{BrowserLauncher, BrowserSession, FetchError};

/// How often the resource count is sampled while waiting for the page to settle.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Consecutive unchanged samples that count as a quiet network (2 × 250ms = 500ms).
const IDLE_QUIET_POLLS: u32 = 2;

const RESOURCE_COUNT_JS: &str = "performance.getEntriesByType('resource').length";
const BODY_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
    /// Per-command CDP timeout; set to the fetch timeout.
    command_timeout: Duration,
}

impl ChromiumLauncher {
    pub fn new(executable: Option<PathBuf>, command_timeout: Duration) -> Self {
        Self {
            executable,
            command_timeout,
        }
    }
}

/// A fresh profile directory per browser so no cookies, cache or profile lock are shared.
fn create_profile_dir() -> Result<TempDir, FetchError> {
    tempfile::Builder::new()
        .prefix("resume-api-chrome-")
        .tempdir()
        .map_err(|e| FetchError::Launch(format!("could not create browser profile: {e}")))
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
        let profile_dir = create_profile_dir()?;
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-setuid-sandbox")
            .user_data_dir(profile_dir.path())
            .request_timeout(self.command_timeout);
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(FetchError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        // The CDP handler must be polled for the browser to make progress.
        let handler_task = tokio::spawn(async move {
            while handler.next().await.is_some() {}
        });

        debug!(profile = %profile_dir.path().display(), "Chromium launched");
        Ok(Box::new(ChromiumSession {
            browser,
            handler_task,
            timeout_secs: self.command_timeout.as_secs(),
            _profile_dir: profile_dir,
        }))
    }
}

/// One headless Chromium process plus the task driving its CDP connection.
///
/// Dropping the session kills the child process (chromiumoxide's `Browser` does this on
/// drop), stops the handler task and deletes the profile directory.
pub struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    timeout_secs: u64,
    // Declared last: removed after the browser field is dropped.
    _profile_dir: TempDir,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn rendered_text(&mut self, url: &str, user_agent: &str) -> Result<String, FetchError> {
        let timeout_secs = self.timeout_secs;
        let classify = move |e: CdpError| classify_cdp_error(e, timeout_secs);

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(classify)?;

        page.set_user_agent(SetUserAgentOverrideParams::new(user_agent))
            .await
            .map_err(classify)?;

        page.goto(url).await.map_err(classify)?;
        wait_for_network_idle(&page, classify).await?;

        let text: String = page
            .evaluate(BODY_TEXT_JS)
            .await
            .map_err(classify)?
            .into_value()
            .map_err(|e| FetchError::Extraction(e.to_string()))?;

        Ok(text)
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        let closed = self.browser.close().await;
        if closed.is_err() {
            // The process did not take the close command; kill it so `wait` returns.
            let _ = self.browser.kill().await;
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        closed
            .map(|_| ())
            .map_err(|e| classify_cdp_error(e, self.timeout_secs))
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

/// Waits until the number of loaded resources stops changing for a quiet window.
///
/// Unbounded on its own; `JobFetcher` wraps the whole navigation in its timeout.
async fn wait_for_network_idle(
    page: &Page,
    classify: impl Fn(CdpError) -> FetchError,
) -> Result<(), FetchError> {
    let mut last_count: Option<f64> = None;
    let mut quiet_polls = 0u32;

    while quiet_polls < IDLE_QUIET_POLLS {
        tokio::time::sleep(IDLE_POLL_INTERVAL).await;

        let count: f64 = page
            .evaluate(RESOURCE_COUNT_JS)
            .await
            .map_err(&classify)?
            .into_value()
            .map_err(|e| FetchError::Extraction(e.to_string()))?;

        if last_count == Some(count) {
            quiet_polls += 1;
        } else {
            quiet_polls = 0;
            last_count = Some(count);
        }
    }
    Ok(())
}

fn classify_cdp_error(error: CdpError, timeout_secs: u64) -> FetchError {
    match error {
        CdpError::Timeout => FetchError::Timeout {
            seconds: timeout_secs,
        },
        CdpError::Ws(e) => FetchError::Network(e.to_string()),
        CdpError::Io(e) => FetchError::Network(e.to_string()),
        other => FetchError::Navigation(other.to_string()),
    }
}
