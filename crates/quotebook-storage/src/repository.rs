//! Row-level access to the authors and quotes tables.
//!
//! Repositories borrow a connection rather than the whole [`Database`] so
//! that several statements can share one transaction. UNIQUE constraint
//! violations are translated into the matching duplicate-entity error here;
//! the schema is the only uniqueness check.
//!
//! [`Database`]: crate::db::Database

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension};

use quotebook_core::error::QuotebookError;
use quotebook_core::pagination::PageRequest;
use quotebook_core::types::{Author, AuthorSummary, Quote};

use crate::db::is_unique_violation;

const DATE_FORMAT: &str = "%Y-%m-%d";

const AUTHOR_COLUMNS: &str =
    "id, name, posted_at, updated_at, date_of_birth, date_of_death";

const QUOTE_SELECT: &str = "SELECT q.id, q.content, q.author_id, a.name, q.posted_at, q.updated_at, q.context
     FROM quotes q JOIN authors a ON a.id = q.author_id";

/// Repository for author rows.
pub struct AuthorRepository<'c> {
    conn: &'c Connection,
}

impl<'c> AuthorRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert a new author and return its id.
    pub fn insert(
        &self,
        name: &str,
        date_of_birth: Option<NaiveDate>,
        date_of_death: Option<NaiveDate>,
        posted_at: DateTime<Utc>,
    ) -> Result<i64, QuotebookError> {
        self.conn
            .execute(
                "INSERT INTO authors (name, posted_at, date_of_birth, date_of_death)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    name,
                    posted_at.timestamp(),
                    date_of_birth.map(format_date),
                    date_of_death.map(format_date),
                ],
            )
            .map_err(|e| duplicate_author_or_storage(e, name))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert an author with only a name unless one with that name exists.
    ///
    /// Returns true when a row was created.
    pub fn insert_if_absent(&self, name: &str, posted_at: DateTime<Utc>) -> Result<bool, QuotebookError> {
        let changed = self
            .conn
            .execute(
                "INSERT INTO authors (name, posted_at) VALUES (?1, ?2)
                 ON CONFLICT (name) DO NOTHING",
                rusqlite::params![name, posted_at.timestamp()],
            )
            .map_err(|e| QuotebookError::Storage(format!("Failed to save author: {}", e)))?;
        Ok(changed == 1)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Author>, QuotebookError> {
        let sql = format!("SELECT {} FROM authors WHERE id = ?1", AUTHOR_COLUMNS);
        let result = self
            .conn
            .query_row(&sql, rusqlite::params![id], |row| Ok(row_to_author(row)))
            .optional()
            .map_err(|e| QuotebookError::Storage(e.to_string()))?;
        result.transpose()
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Author>, QuotebookError> {
        let sql = format!("SELECT {} FROM authors WHERE name = ?1", AUTHOR_COLUMNS);
        let result = self
            .conn
            .query_row(&sql, rusqlite::params![name], |row| Ok(row_to_author(row)))
            .optional()
            .map_err(|e| QuotebookError::Storage(e.to_string()))?;
        result.transpose()
    }

    pub fn count(&self) -> Result<u64, QuotebookError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))
            .map_err(|e| QuotebookError::Storage(e.to_string()))?;
        Ok(count as u64)
    }

    /// One window of authors in insertion order.
    pub fn list(&self, window: PageRequest) -> Result<Vec<Author>, QuotebookError> {
        let sql = format!(
            "SELECT {} FROM authors ORDER BY id ASC LIMIT ?1 OFFSET ?2",
            AUTHOR_COLUMNS
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| QuotebookError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(
                rusqlite::params![window.limit as i64, window.offset as i64],
                |row| Ok(row_to_author(row)),
            )
            .map_err(|e| QuotebookError::Storage(e.to_string()))?;

        let mut authors = Vec::new();
        for row in rows {
            let author = row.map_err(|e| QuotebookError::Storage(e.to_string()))??;
            authors.push(author);
        }
        Ok(authors)
    }

    /// Persist the mutable fields of an author.
    pub fn update(&self, author: &Author) -> Result<(), QuotebookError> {
        self.conn
            .execute(
                "UPDATE authors
                 SET name = ?1, updated_at = ?2, date_of_birth = ?3, date_of_death = ?4
                 WHERE id = ?5",
                rusqlite::params![
                    author.name,
                    author.updated_at.map(|t| t.timestamp()),
                    author.date_of_birth.map(format_date),
                    author.date_of_death.map(format_date),
                    author.id,
                ],
            )
            .map_err(|e| duplicate_author_or_storage(e, &author.name))?;
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<usize, QuotebookError> {
        self.conn
            .execute("DELETE FROM authors WHERE id = ?1", rusqlite::params![id])
            .map_err(|e| QuotebookError::Storage(format!("Failed to delete author: {}", e)))
    }
}

/// Repository for quote rows. Every read joins the owning author's name.
pub struct QuoteRepository<'c> {
    conn: &'c Connection,
}

impl<'c> QuoteRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert a new quote and return its id.
    pub fn insert(
        &self,
        content: &str,
        author_id: i64,
        context: Option<&str>,
        posted_at: DateTime<Utc>,
    ) -> Result<i64, QuotebookError> {
        self.conn
            .execute(
                "INSERT INTO quotes (content, author_id, posted_at, context)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![content, author_id, posted_at.timestamp(), context],
            )
            .map_err(duplicate_quote_or_storage)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Quote>, QuotebookError> {
        let sql = format!("{} WHERE q.id = ?1", QUOTE_SELECT);
        let result = self
            .conn
            .query_row(&sql, rusqlite::params![id], |row| Ok(row_to_quote(row)))
            .optional()
            .map_err(|e| QuotebookError::Storage(e.to_string()))?;
        result.transpose()
    }

    pub fn count(&self) -> Result<u64, QuotebookError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))
            .map_err(|e| QuotebookError::Storage(e.to_string()))?;
        Ok(count as u64)
    }

    pub fn count_by_author(&self, author_id: i64) -> Result<u64, QuotebookError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM quotes WHERE author_id = ?1",
                rusqlite::params![author_id],
                |row| row.get(0),
            )
            .map_err(|e| QuotebookError::Storage(e.to_string()))?;
        Ok(count as u64)
    }

    /// One window of all quotes in insertion order.
    pub fn list(&self, window: PageRequest) -> Result<Vec<Quote>, QuotebookError> {
        let sql = format!("{} ORDER BY q.id ASC LIMIT ?1 OFFSET ?2", QUOTE_SELECT);
        self.collect(
            &sql,
            rusqlite::params![window.limit as i64, window.offset as i64],
        )
    }

    /// One window of a single author's quotes in insertion order.
    pub fn list_by_author(
        &self,
        author_id: i64,
        window: PageRequest,
    ) -> Result<Vec<Quote>, QuotebookError> {
        let sql = format!(
            "{} WHERE q.author_id = ?1 ORDER BY q.id ASC LIMIT ?2 OFFSET ?3",
            QUOTE_SELECT
        );
        self.collect(
            &sql,
            rusqlite::params![author_id, window.limit as i64, window.offset as i64],
        )
    }

    /// Persist the mutable fields of a quote. The author is never changed here.
    pub fn update(&self, quote: &Quote) -> Result<(), QuotebookError> {
        self.conn
            .execute(
                "UPDATE quotes SET content = ?1, context = ?2, updated_at = ?3 WHERE id = ?4",
                rusqlite::params![
                    quote.content,
                    quote.context,
                    quote.updated_at.map(|t| t.timestamp()),
                    quote.id,
                ],
            )
            .map_err(duplicate_quote_or_storage)?;
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<usize, QuotebookError> {
        self.conn
            .execute("DELETE FROM quotes WHERE id = ?1", rusqlite::params![id])
            .map_err(|e| QuotebookError::Storage(format!("Failed to delete quote: {}", e)))
    }

    pub fn delete_by_author(&self, author_id: i64) -> Result<usize, QuotebookError> {
        self.conn
            .execute(
                "DELETE FROM quotes WHERE author_id = ?1",
                rusqlite::params![author_id],
            )
            .map_err(|e| QuotebookError::Storage(format!("Failed to delete quotes: {}", e)))
    }

    fn collect(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Quote>, QuotebookError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| QuotebookError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params, |row| Ok(row_to_quote(row)))
            .map_err(|e| QuotebookError::Storage(e.to_string()))?;

        let mut quotes = Vec::new();
        for row in rows {
            let quote = row.map_err(|e| QuotebookError::Storage(e.to_string()))??;
            quotes.push(quote);
        }
        Ok(quotes)
    }
}

fn duplicate_author_or_storage(err: rusqlite::Error, name: &str) -> QuotebookError {
    if is_unique_violation(&err) {
        QuotebookError::DuplicateAuthor {
            name: name.to_string(),
        }
    } else {
        QuotebookError::Storage(format!("Failed to save author: {}", err))
    }
}

fn duplicate_quote_or_storage(err: rusqlite::Error) -> QuotebookError {
    if is_unique_violation(&err) {
        QuotebookError::DuplicateQuote
    } else {
        QuotebookError::Storage(format!("Failed to save quote: {}", err))
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: Option<String>) -> Result<Option<NaiveDate>, QuotebookError> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map_err(|e| QuotebookError::Storage(format!("Invalid stored date '{}': {}", s, e)))
        })
        .transpose()
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

fn row_to_author(row: &rusqlite::Row<'_>) -> Result<Author, QuotebookError> {
    let id: i64 = row
        .get(0)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;
    let name: String = row
        .get(1)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;
    let posted_at: i64 = row
        .get(2)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;
    let updated_at: Option<i64> = row
        .get(3)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;
    let date_of_birth: Option<String> = row
        .get(4)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;
    let date_of_death: Option<String> = row
        .get(5)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;

    Ok(Author {
        id,
        name,
        posted_at: timestamp(posted_at),
        updated_at: updated_at.map(timestamp),
        date_of_birth: parse_date(date_of_birth)?,
        date_of_death: parse_date(date_of_death)?,
    })
}

fn row_to_quote(row: &rusqlite::Row<'_>) -> Result<Quote, QuotebookError> {
    let id: i64 = row
        .get(0)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;
    let content: String = row
        .get(1)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;
    let author_id: i64 = row
        .get(2)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;
    let author_name: String = row
        .get(3)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;
    let posted_at: i64 = row
        .get(4)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;
    let updated_at: Option<i64> = row
        .get(5)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;
    let context: Option<String> = row
        .get(6)
        .map_err(|e| QuotebookError::Storage(e.to_string()))?;

    Ok(Quote {
        id,
        content,
        author: AuthorSummary {
            id: author_id,
            name: author_name,
        },
        posted_at: timestamp(posted_at),
        updated_at: updated_at.map(timestamp),
        context,
    })
}
