//! Page geometry: the fixed measurements that govern pagination.
//!
//! All lengths are millimetres measured from the top-left corner of the page,
//! matching the coordinate space of `LayoutInstruction`. The PDF encoder is the only
//! place that converts to points and flips the y axis.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::font_metrics::{get_metrics, FontFamily};

/// Points per millimetre (72pt per inch / 25.4mm per inch).
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// What the wrapper does with a single token wider than the usable width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LongTokenPolicy {
    /// Emit the token on its own line, unsplit, even though it overflows the margin.
    #[default]
    Overflow,
    /// Break the token at character boundaries into chunks that each fit.
    HardSplit,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("page geometry field '{field}' must be a finite number")]
    NonFinite { field: &'static str },

    #[error("page geometry field '{field}' must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("page geometry field '{field}' must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("margins ({margin} x 2) leave no usable width on a {page_width} wide page")]
    MarginTooWide { margin: f32, page_width: f32 },

    #[error("page break threshold {max_y} is above the first line at {top_offset}")]
    BreakAboveTop { top_offset: f32, max_y: f32 },

    #[error("page break threshold {max_y} is below the page bottom at {page_height}")]
    BreakBelowPage { max_y: f32, page_height: f32 },
}

/// Layout parameters for the paginated resume document.
///
/// Invariant (checked by `validate`): `margin * 2 < page_width`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Left and right margin. Lines are placed at `x = margin`.
    pub margin: f32,
    /// Baseline of the first line on every page.
    pub top_offset: f32,
    pub line_height: f32,
    /// A line whose baseline would fall below this starts a new page instead.
    pub max_y: f32,
    pub font: FontFamily,
    pub font_size_pt: f32,
    pub long_token_policy: LongTokenPolicy,
}

impl PageGeometry {
    /// A4 portrait, 20mm margins, 11pt text on a 7mm line pitch, breaking after y=280.
    pub fn a4(font: FontFamily) -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 20.0,
            top_offset: 20.0,
            line_height: 7.0,
            max_y: 280.0,
            font,
            font_size_pt: 11.0,
            long_token_policy: LongTokenPolicy::Overflow,
        }
    }

    pub fn usable_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Rendered width of `text` in millimetres at this geometry's font and size.
    pub fn measure(&self, text: &str) -> f32 {
        self.em_to_mm(get_metrics(&self.font).measure_str(text))
    }

    /// Width of the single space the wrapper puts between words, in millimetres.
    pub fn space_width(&self) -> f32 {
        self.em_to_mm(get_metrics(&self.font).space_width)
    }

    pub(crate) fn em_to_mm(&self, em: f32) -> f32 {
        em * self.font_size_pt / PT_PER_MM
    }

    /// Rejects any geometry that cannot be laid out or could stall the page-break loop.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let fields = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("margin", self.margin),
            ("top_offset", self.top_offset),
            ("line_height", self.line_height),
            ("max_y", self.max_y),
            ("font_size_pt", self.font_size_pt),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(LayoutError::NonFinite { field });
            }
        }

        let positive = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("line_height", self.line_height),
            ("font_size_pt", self.font_size_pt),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(LayoutError::NonPositive { field, value });
            }
        }

        for (field, value) in [("margin", self.margin), ("top_offset", self.top_offset)] {
            if value < 0.0 {
                return Err(LayoutError::Negative { field, value });
            }
        }

        if self.margin * 2.0 >= self.page_width {
            return Err(LayoutError::MarginTooWide {
                margin: self.margin,
                page_width: self.page_width,
            });
        }
        if self.max_y < self.top_offset {
            return Err(LayoutError::BreakAboveTop {
                top_offset: self.top_offset,
                max_y: self.max_y,
            });
        }
        if self.max_y > self.page_height {
            return Err(LayoutError::BreakBelowPage {
                max_y: self.max_y,
                page_height: self.page_height,
            });
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4(FontFamily::Helvetica)
    }
}
