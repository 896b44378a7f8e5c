// PDF rendering: layout instructions → document bytes, plus the download endpoint.

pub mod handlers;
pub mod pdf;
