//! Delve Report - rendering and persistence of finished research reports
//!
//! Markdown is the canonical output of a research run; this crate turns it into
//! a standalone HTML page and writes either form into the reports directory.

pub mod render;
pub mod writer;

pub use render::{render_document, render_fragment};
pub use writer::{ReportKind, ReportWriter};
