use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::layout::FontFamily;
use crate::scraper::DEFAULT_FETCH_TIMEOUT;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub fetch_timeout: Duration,
    pub chrome_executable: Option<PathBuf>,
    pub pdf_font: FontFamily,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let anthropic_api_key = get("ANTHROPIC_API_KEY").with_context(|| {
            "Required environment variable 'ANTHROPIC_API_KEY' is not set".to_string()
        })?;

        let port = get("PORT")
            .unwrap_or_else(|| "3001".to_string())
            .trim()
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let fetch_timeout = match get("FETCH_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?;
                if secs == 0 {
                    bail!("FETCH_TIMEOUT_SECS must be greater than zero");
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_FETCH_TIMEOUT,
        };

        let pdf_font = match get("PDF_FONT") {
            Some(raw) => raw
                .parse::<FontFamily>()
                .map_err(anyhow::Error::msg)
                .context("PDF_FONT is invalid")?,
            None => FontFamily::Helvetica,
        };

        Ok(Config {
            anthropic_api_key,
            port,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            fetch_timeout,
            chrome_executable: get("CHROME_EXECUTABLE").map(PathBuf::from),
            pdf_font,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("anthropic_api_key", &"<redacted>")
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("chrome_executable", &self.chrome_executable)
            .field("pdf_font", &self.pdf_font)
            .finish()
    }
}
