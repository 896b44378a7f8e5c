//! Job-posting fetcher: renders a posting in a headless browser and extracts its text.
//!
//! # Resource model
//! Every `fetch` acquires exactly one browser through `BrowserLauncher` and holds it in a
//! `ScopedBrowser`. The guard is released (closed) on every exit path before `fetch`
//! returns: success, navigation failure, and timeout alike. If the fetch future itself is
//! dropped mid-flight, the session's destructor tears the browser down instead.

pub mod chromium;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use thiserror::Error;
use tracing::{info, warn};

/// Desktop Chrome identity; several job boards serve a stripped page to headless agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on closing a session. Past it the session is dropped, which kills the process.
pub const RELEASE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid job URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not launch browser: {0}")]
    Launch(String),

    #[error("navigation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("could not extract page text: {0}")]
    Extraction(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Browser seam
// ────────────────────────────────────────────────────────────────────────────

/// Starts one browser instance per call.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError>;
}

/// A live browser owned by a single fetch.
///
/// Implementations must also tear the browser down when dropped without `close`.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigates to `url`, waits for the network to settle, returns the body's visible text.
    async fn rendered_text(&mut self, url: &str, user_agent: &str) -> Result<String, FetchError>;

    async fn close(&mut self) -> Result<(), FetchError>;
}

/// Scoped acquisition of a browser session. `release` consumes the guard, so a session
/// is closed at most once.
struct ScopedBrowser {
    session: Option<Box<dyn BrowserSession>>,
}

impl ScopedBrowser {
    async fn acquire(launcher: &dyn BrowserLauncher) -> Result<Self, FetchError> {
        let session = launcher.launch().await?;
        Ok(Self {
            session: Some(session),
        })
    }

    async fn rendered_text(&mut self, url: &str, user_agent: &str) -> Result<String, FetchError> {
        match self.session.as_mut() {
            Some(session) => session.rendered_text(url, user_agent).await,
            None => Err(FetchError::Launch("browser session already released".to_string())),
        }
    }

    /// Closes the session, giving up after `limit`. On timeout the session is dropped
    /// here, and its destructor tears the browser down.
    async fn release(mut self, limit: Duration) -> Result<(), FetchError> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        match tokio::time::timeout(limit, session.close()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                seconds: limit.as_secs(),
            }),
        }
    }
}

impl Drop for ScopedBrowser {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("Browser session dropped before release; tearing it down");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fetcher
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct JobFetcher {
    launcher: Arc<dyn BrowserLauncher>,
    timeout: Duration,
}

impl JobFetcher {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, timeout: Duration) -> Self {
        Self { launcher, timeout }
    }

    /// Fetches the rendered, visible text of a job posting.
    ///
    /// The URL is validated before any browser starts. The navigate/settle/extract step
    /// is bounded by the fetcher's timeout and closing by `RELEASE_TIMEOUT`. The browser
    /// is gone before this returns.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let url = parse_job_url(url)?;

        let mut browser = ScopedBrowser::acquire(self.launcher.as_ref()).await?;
        let outcome = match tokio::time::timeout(
            self.timeout,
            browser.rendered_text(url.as_str(), USER_AGENT),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        };
        let released = browser.release(RELEASE_TIMEOUT).await;

        let text = outcome?;
        if let Err(e) = released {
            warn!(job_url = %url, "Browser did not close cleanly: {e}");
        }

        info!(
            job_url = %url,
            chars = text.chars().count(),
            "Fetched job description"
        );
        Ok(text)
    }
}

/// Accepts only absolute http(s) URLs.
fn parse_job_url(raw: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Clone, Copy)]
    enum Behavior {
        Succeed,
        FailNavigation,
        Hang,
        HangOnClose,
        FailLaunch,
    }

    /// Counts launches and closes so tests can assert the browser is released exactly once.
    struct CountingLauncher {
        behavior: Behavior,
        launches: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl CountingLauncher {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                launches: Arc::new(AtomicUsize::new(0)),
                closes: Arc::new(AtomicUsize::new(0)),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    struct CountingSession {
        behavior: Behavior,
        closes: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl BrowserLauncher for CountingLauncher {
        async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
            if let Behavior::FailLaunch = self.behavior {
                return Err(FetchError::Launch("no chromium binary".to_string()));
            }
            self.launches.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingSession {
                behavior: self.behavior,
                closes: self.closes.clone(),
                seen: self.seen.clone(),
            }))
        }
    }

    #[async_trait]
    impl BrowserSession for CountingSession {
        async fn rendered_text(
            &mut self,
            url: &str,
            user_agent: &str,
        ) -> Result<String, FetchError> {
            self.seen
                .lock()
                .unwrap()
                .push((url.to_string(), user_agent.to_string()));
            match self.behavior {
                Behavior::Succeed | Behavior::HangOnClose => {
                    Ok("Senior Rust Engineer\nRemote".to_string())
                }
                Behavior::FailNavigation => {
                    Err(FetchError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string()))
                }
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
                Behavior::FailLaunch => unreachable!("session never created"),
            }
        }

        async fn close(&mut self) -> Result<(), FetchError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if let Behavior::HangOnClose = self.behavior {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Ok(())
        }
    }

    fn fetcher_for(launcher: &Arc<CountingLauncher>) -> JobFetcher {
        JobFetcher::new(launcher.clone(), DEFAULT_FETCH_TIMEOUT)
    }

    #[tokio::test]
    async fn test_fetch_returns_text_and_releases_once() {
        let launcher = Arc::new(CountingLauncher::new(Behavior::Succeed));
        let text = fetcher_for(&launcher)
            .fetch("https://jobs.example.com/123")
            .await
            .unwrap();

        assert_eq!(text, "Senior Rust Engineer\nRemote");
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert_eq!(launcher.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_user_agent() {
        let launcher = Arc::new(CountingLauncher::new(Behavior::Succeed));
        fetcher_for(&launcher)
            .fetch("https://jobs.example.com/123")
            .await
            .unwrap();

        let seen = launcher.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "https://jobs.example.com/123");
        assert!(seen[0].1.contains("Chrome/120"));
    }

    #[tokio::test]
    async fn test_navigation_failure_still_releases_once() {
        let launcher = Arc::new(CountingLauncher::new(Behavior::FailNavigation));
        let result = fetcher_for(&launcher)
            .fetch("https://jobs.example.com/404")
            .await;

        assert!(matches!(result, Err(FetchError::Navigation(_))));
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert_eq!(launcher.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_releases_once() {
        let launcher = Arc::new(CountingLauncher::new(Behavior::Hang));
        let result = fetcher_for(&launcher)
            .fetch("https://jobs.example.com/slow")
            .await;

        assert!(matches!(result, Err(FetchError::Timeout { seconds: 30 })));
        assert_eq!(launcher.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wedged_close_does_not_block_fetch() {
        let launcher = Arc::new(CountingLauncher::new(Behavior::HangOnClose));
        let text = fetcher_for(&launcher)
            .fetch("https://jobs.example.com/123")
            .await
            .unwrap();

        assert_eq!(text, "Senior Rust Engineer\nRemote");
        assert_eq!(launcher.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_launch_failure_releases_nothing() {
        let launcher = Arc::new(CountingLauncher::new(Behavior::FailLaunch));
        let result = fetcher_for(&launcher)
            .fetch("https://jobs.example.com/123")
            .await;

        assert!(matches!(result, Err(FetchError::Launch(_))));
        assert_eq!(launcher.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_never_launches_browser() {
        let launcher = Arc::new(CountingLauncher::new(Behavior::Succeed));
        let fetcher = fetcher_for(&launcher);

        for bad in ["", "not a url", "ftp://jobs.example.com/1", "file:///etc/passwd"] {
            let result = fetcher.fetch(bad).await;
            assert!(
                matches!(result, Err(FetchError::InvalidUrl { .. })),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_parse_job_url_trims_whitespace() {
        let url = parse_job_url("  https://jobs.example.com/123  ").unwrap();
        assert_eq!(url.as_str(), "https://jobs.example.com/123");
    }
}
