//! Database schema definitions
//!
//! This module contains the SQL schema for the skipped-page database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Pages left out of analysis, serialized as JSON
CREATE TABLE IF NOT EXISTS skipped_pages (
    url TEXT PRIMARY KEY,
    reason TEXT,
    data TEXT NOT NULL,
    stored_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_skipped_pages_reason ON skipped_pages(reason);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
