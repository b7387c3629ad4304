//! Storage traits and error types
//!
//! This module defines the trait interface for the skipped-page store and
//! its error type.

use crate::model::PageResult;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only store of pages the crawl skipped
///
/// Keyed by canonical URL. The audit writes to it but never reads it back;
/// the read side exists for later inspection.
pub trait SkippedPageStore {
    /// Upserts every page, replacing an earlier entry with the same URL
    ///
    /// # Returns
    ///
    /// The number of pages written
    fn save_pages(&mut self, pages: &[&PageResult]) -> StorageResult<usize>;

    /// Loads the stored page for a canonical URL
    fn load_page(&self, url: &str) -> StorageResult<Option<PageResult>>;

    /// Number of stored pages
    fn count_pages(&self) -> StorageResult<u64>;
}
