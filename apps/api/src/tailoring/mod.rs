//! Resume tailoring: rewrites a master resume toward one job description.
//!
//! All LLM calls go through llm_client; the `ResumeTailor` trait is the seam handlers
//! depend on, so the model can be swapped or stubbed.

pub mod handlers;
pub mod prompts;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, PLAIN_TEXT_ONLY};
use crate::llm_client::{LlmClient, LlmError, LlmResponse};
use crate::tailoring::prompts::{TAILOR_PROMPT_TEMPLATE, TAILOR_SYSTEM};

/// Scraped pages can carry whole site navigations; anything past this is dropped
/// before prompting so one noisy page cannot exhaust the context window.
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 30_000;

#[derive(Debug, Error)]
pub enum TailoringError {
    #[error("language model request failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("language model returned an unusable response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait ResumeTailor: Send + Sync {
    /// Returns the tailored resume as a single plain-text block.
    async fn tailor(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<String, TailoringError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Claude-backed implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct ClaudeTailor {
    llm: LlmClient,
}

impl ClaudeTailor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeTailor for ClaudeTailor {
    async fn tailor(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<String, TailoringError> {
        let job_description = truncate_chars(job_description, MAX_JOB_DESCRIPTION_CHARS);
        let prompt = build_tailor_prompt(resume_text, job_description);

        let response = self.llm.call(&prompt, TAILOR_SYSTEM).await?;
        let tailored = extract_tailored_text(&response)?;

        info!(
            resume_chars = resume_text.chars().count(),
            tailored_chars = tailored.chars().count(),
            "Tailored resume generated"
        );
        Ok(tailored)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn build_tailor_prompt(resume_text: &str, job_description: &str) -> String {
    fill_template(
        TAILOR_PROMPT_TEMPLATE,
        &[
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("output_instruction", PLAIN_TEXT_ONLY),
            ("job_description", job_description),
            ("resume_text", resume_text),
        ],
    )
}

/// Substitutes `{name}` placeholders in one pass over `template`.
///
/// Only the template is scanned. Inserted values are copied verbatim, so braces inside
/// scraped or user text are never treated as placeholders. Unknown `{...}` is kept as is.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_brace = &rest[open + 1..];
        let hit = values.iter().find(|(name, _)| {
            after_brace
                .strip_prefix(name)
                .is_some_and(|tail| tail.starts_with('}'))
        });
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after_brace[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }
    out.push_str(rest);
    out
}

/// The first text block, trimmed. A missing or blank block is a malformed response.
pub(crate) fn extract_tailored_text(response: &LlmResponse) -> Result<String, TailoringError> {
    let text = response.text().ok_or_else(|| {
        TailoringError::MalformedResponse("response contained no text block".to_string())
    })?;
    let text = text.trim();
    if text.is_empty() {
        return Err(TailoringError::MalformedResponse(
            "response text was empty".to_string(),
        ));
    }
    Ok(text.to_string())
}

/// Cuts `text` to at most `max_chars` characters, on a character boundary.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            warn!(
                original_chars = text.chars().count(),
                kept_chars = max_chars,
                "Job description truncated before prompting"
            );
            &text[..byte_index]
        }
        None => text,
    }
}
