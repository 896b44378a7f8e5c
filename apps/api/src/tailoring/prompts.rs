// Prompt constants for resume tailoring.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for resume tailoring.
pub const TAILOR_SYSTEM: &str = "You are an expert resume writer. \
    You rewrite a candidate's existing resume so the most relevant experience for a \
    specific role stands out, without changing any facts.";

/// Resume tailoring prompt template.
/// Replace: {grounding_instruction}, {output_instruction}, {resume_text}, {job_description}
pub const TAILOR_PROMPT_TEMPLATE: &str = r#"Here is my complete resume:

{resume_text}

Here is the job description I'm applying for:

{job_description}

Please rewrite my resume to emphasize the most relevant experience for this specific role.

{grounding_instruction}

Rules:
- Reframe bullet points to highlight relevant skills and accomplishments
- Adjust the emphasis and ordering to match the job requirements
- Keep all achievements truthful - do not make up any experience
- Maintain professional resume formatting
- Keep the same overall structure but optimize the content

{output_instruction}

Return the complete tailored resume, ready to copy and paste."#;
