// Layout: word-wrap and pagination of resume text onto fixed-size pages.
// Pure and CPU-bound; async callers must run it inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod geometry;
pub mod paginator;

// Re-export the public API consumed by the renderer and handlers.
pub use font_metrics::FontFamily;
pub use geometry::{LayoutError, PageGeometry};
pub use paginator::{page_count, paginate, LayoutInstruction};
