//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of [`SkippedPageStore`].

use crate::model::PageResult;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{SkippedPageStore, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path`
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl SkippedPageStore for SqliteStorage {
    fn save_pages(&mut self, pages: &[&PageResult]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO skipped_pages (url, reason, data, stored_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for page in pages {
                let data = serde_json::to_string(page)?;
                stmt.execute(params![page.url, page.skipped_reason, data, now])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Stored {} skipped pages", pages.len());
        Ok(pages.len())
    }

    fn load_page(&self, url: &str) -> StorageResult<Option<PageResult>> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM skipped_pages WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn count_pages(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM skipped_pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
