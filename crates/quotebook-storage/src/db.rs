//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access.
//! Configures WAL mode and foreign keys on initialization.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, ErrorCode, Transaction};
use tracing::info;

use quotebook_core::error::QuotebookError;

use crate::migrations;

/// Thread-safe SQLite database wrapper.
///
/// The connection is wrapped in a Mutex since rusqlite Connection is not
/// Sync. Every closure passed to [`Database::with_conn`] or
/// [`Database::transaction`] runs with exclusive access.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self, QuotebookError> {
        Self::open(path, true)
    }

    /// Open (or create) a database at the given path.
    ///
    /// Configures WAL mode, synchronous=NORMAL and foreign keys. Migrations
    /// run only when `setup` is true.
    pub fn open(path: &Path, setup: bool) -> Result<Self, QuotebookError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| QuotebookError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| QuotebookError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());

        let db = Self {
            conn: Mutex::new(conn),
        };

        if setup {
            db.with_conn(migrations::run_migrations)?;
        }

        Ok(db)
    }

    /// Open an in-memory database with the full schema (for testing).
    pub fn in_memory() -> Result<Self, QuotebookError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| QuotebookError::Storage(format!("Failed to open in-memory db: {}", e)))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| QuotebookError::Storage(format!("Failed to set pragmas: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.with_conn(migrations::run_migrations)?;

        Ok(db)
    }

    /// Execute a closure with a reference to the underlying connection.
    ///
    /// The mutex is held for the duration of the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, QuotebookError>
    where
        F: FnOnce(&Connection) -> Result<T, QuotebookError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| QuotebookError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Execute a closure inside a single transaction.
    ///
    /// The transaction commits when the closure returns `Ok` and rolls back
    /// on `Err`.
    pub fn transaction<F, T>(&self, f: F) -> Result<T, QuotebookError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, QuotebookError>,
    {
        self.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| QuotebookError::Storage(format!("Failed to begin transaction: {}", e)))?;
            let value = f(&tx)?;
            tx.commit()
                .map_err(|e| QuotebookError::Storage(format!("Failed to commit: {}", e)))?;
            Ok(value)
        })
    }

    /// Check that the store answers queries.
    pub fn ping(&self) -> Result<(), QuotebookError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(|e| QuotebookError::Storage(e.to_string()))?;
            Ok(())
        })
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}

/// Whether an error is a UNIQUE (or primary key) constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}
