//! Storage module for persisting skipped pages
//!
//! Pages the audit did not analyze (currently `noindex` pages) are parked in
//! an append-only SQLite store keyed by canonical URL for later inspection.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{SkippedPageStore, StorageError, StorageResult};

use std::path::Path;

/// Opens or creates the skipped-page database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}
