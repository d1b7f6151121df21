//! Database schema migrations.
//!
//! Applies the initial schema: the authors and quotes tables plus the
//! schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use quotebook_core::error::QuotebookError;

/// Run all pending database migrations.
///
/// Future migrations can be added by checking the current version and
/// applying incremental changes.
pub fn run_migrations(conn: &Connection) -> Result<(), QuotebookError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| QuotebookError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version = current_version(conn)?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Highest applied migration version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> Result<i64, QuotebookError> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .map_err(|e| QuotebookError::Storage(format!("Failed to query migration version: {}", e)))
}

/// Version 1: Initial schema.
///
/// Uniqueness lives in the schema: author names are globally unique and a
/// quote's content is unique per author.
fn apply_v1(conn: &Connection) -> Result<(), QuotebookError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS authors (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL UNIQUE,
            posted_at       INTEGER NOT NULL,
            updated_at      INTEGER,
            date_of_birth   TEXT,
            date_of_death   TEXT
        );

        CREATE TABLE IF NOT EXISTS quotes (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            content         TEXT NOT NULL,
            author_id       INTEGER NOT NULL,
            posted_at       INTEGER NOT NULL,
            updated_at      INTEGER,
            context         TEXT,
            UNIQUE (author_id, content),
            FOREIGN KEY (author_id) REFERENCES authors(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_quotes_author
            ON quotes (author_id, id);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| QuotebookError::Storage(format!("Migration v1 failed: {}", e)))?;

    Ok(())
}
