// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments.

/// Instruction appended to every prompt that rewrites user-supplied documents.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Use ONLY facts and experience present in the source document. \
    Do NOT infer, interpolate, or invent employers, titles, dates, metrics, or skills. \
    If the source does not support a claim, omit it entirely.";

/// Instruction that keeps the model's reply to the requested artifact only.
pub const PLAIN_TEXT_ONLY: &str = "\
    Return the result as plain text only. \
    Do NOT use markdown formatting or code fences. \
    Do NOT add any introduction, explanation, or closing remarks.";
