//! Text Paginator: turns free-form resume text into positioned lines on fixed-size pages.
//!
//! # Algorithm
//! 1. Split on `\n` into paragraphs. Blank paragraphs are kept: each one still occupies
//!    a line slot, emitted as an instruction with empty text.
//! 2. Greedy word-wrap each paragraph to the usable width, measured with
//!    `PageGeometry::measure`. Tokens wider than a whole line follow the
//!    geometry's `LongTokenPolicy`.
//! 3. Place lines top to bottom. A line whose baseline would pass `max_y` goes to the
//!    top of the next page instead.
//!
//! CPU-bound: callers on the async side run it via `tokio::task::spawn_blocking`.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::get_metrics;
use crate::layout::geometry::{LayoutError, LongTokenPolicy, PageGeometry};

/// A single positioned line of text destined for one page.
///
/// `x`/`y` are millimetres from the top-left corner; `y` is the text baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInstruction {
    pub page_index: usize,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Lays `text` out on pages described by `geometry`.
///
/// Empty input yields exactly one blank instruction at the top of page 0: the empty
/// string is a single blank paragraph like any other.
pub fn paginate(
    text: &str,
    geometry: &PageGeometry,
) -> Result<Vec<LayoutInstruction>, LayoutError> {
    geometry.validate()?;

    let mut instructions = Vec::new();
    let mut page_index = 0usize;
    let mut line_on_page = 0u32;

    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);

        for line in wrap_paragraph(paragraph, geometry) {
            let mut y = geometry.top_offset + line_on_page as f32 * geometry.line_height;
            if y > geometry.max_y {
                page_index += 1;
                line_on_page = 0;
                y = geometry.top_offset;
            }

            instructions.push(LayoutInstruction {
                page_index,
                x: geometry.margin,
                y,
                text: line,
            });
            line_on_page += 1;
        }
    }

    Ok(instructions)
}

/// Number of pages the instructions span. A document always has at least one page.
pub fn page_count(instructions: &[LayoutInstruction]) -> usize {
    instructions.last().map_or(1, |i| i.page_index + 1)
}

/// Greedy word-wrap of a single paragraph. Always returns at least one line.
///
/// Runs of whitespace between words collapse to one space; leading indentation is kept
/// on the first line.
pub(crate) fn wrap_paragraph(paragraph: &str, geometry: &PageGeometry) -> Vec<String> {
    let max_width = geometry.usable_width();
    let space_width = geometry.space_width();

    let body = paragraph.trim_start();
    let indent = &paragraph[..paragraph.len() - body.len()];

    let mut words = body.split_whitespace();
    let Some(first_word) = words.next() else {
        return vec![String::new()];
    };
    let first_token = format!("{indent}{first_word}");

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in std::iter::once(first_token.as_str()).chain(words) {
        let word_w = geometry.measure(word);

        if !current.is_empty() {
            if current_width + space_width + word_w <= max_width {
                current.push(' ');
                current.push_str(word);
                current_width += space_width + word_w;
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }

        // `word` opens a fresh line.
        if word_w > max_width && geometry.long_token_policy == LongTokenPolicy::HardSplit {
            let (chunks, tail, tail_width) = split_token(word, geometry);
            lines.extend(chunks);
            current = tail;
            current_width = tail_width;
        } else {
            current.push_str(word);
            current_width = word_w;
        }
    }
    lines.push(current);

    lines
}

/// Breaks an over-wide token into full-width chunks plus a trailing remainder.
///
/// Every chunk holds at least one character, so a glyph wider than the whole line
/// still makes progress.
fn split_token(token: &str, geometry: &PageGeometry) -> (Vec<String>, String, f32) {
    let metrics = get_metrics(&geometry.font);
    let max_width = geometry.usable_width();
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_width = 0.0_f32;

    for c in token.chars() {
        let w = geometry.em_to_mm(metrics.char_width(c));
        if !chunk.is_empty() && chunk_width + w > max_width {
            chunks.push(std::mem::take(&mut chunk));
            chunk_width = 0.0;
        }
        chunk.push(c);
        chunk_width += w;
    }

    (chunks, chunk, chunk_width)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
