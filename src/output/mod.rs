//! Output module for audit reports
//!
//! This module handles:
//! - Aggregating findings into per-category summary tables
//! - Writing `findings.json` and the static `report.html`
//! - Printing end-of-run statistics

mod html;
mod json;
pub mod stats;
mod summary;

pub use html::{escape_html, render_html, write_html, HTML_FILE_NAME};
pub use json::{write_json, JSON_FILE_NAME};
pub use stats::{print_statistics, AuditStatistics};
pub use summary::{summarize, total, SummaryTables};

use thiserror::Error;

/// Errors raised while writing report artifacts
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type OutputResult<T> = std::result::Result<T, OutputError>;
