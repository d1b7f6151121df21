//! Create/read/update/delete operations for authors and quotes.
//!
//! Each operation validates the submitted object, then runs as one
//! transaction against the store. Duplicate names and duplicate quote
//! content are detected by the schema's UNIQUE constraints, so concurrent
//! creates cannot both succeed.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use serde_json::{json, Map, Value};
use tracing::debug;

use quotebook_core::error::{EntityKind, QuotebookError, Result};
use quotebook_core::pagination::{Page, PageRequest};
use quotebook_core::types::{Author, Quote};
use quotebook_core::validation::{self, Mode, NewQuote};

use crate::db::Database;
use crate::repository::{AuthorRepository, QuoteRepository};

/// CRUD service over the entity store.
#[derive(Debug, Clone)]
pub struct CrudService {
    db: Arc<Database>,
}

impl CrudService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    // =========================================================================
    // Authors
    // =========================================================================

    /// Create an author, plus any nested quotes, in one transaction.
    pub fn create_author(&self, data: &Map<String, Value>) -> Result<Author> {
        let new = validation::new_author(data)?;
        let now = now();

        self.db.transaction(|tx| {
            let authors = AuthorRepository::new(tx);
            let quotes = QuoteRepository::new(tx);

            let id = authors.insert(&new.name, new.date_of_birth, new.date_of_death, now)?;
            for quote in &new.quotes {
                quotes.insert(&quote.content, id, quote.context.as_deref(), now)?;
            }
            debug!(author_id = id, quotes = new.quotes.len(), "Author created");

            existing_author(tx, id)
        })
    }

    pub fn read_author(&self, id: i64) -> Result<Author> {
        self.db.with_conn(|conn| existing_author(conn, id))
    }

    /// A window of authors in insertion order, with the total count.
    pub fn list_authors(&self, request: PageRequest) -> Result<Page<Author>> {
        self.db.with_conn(|conn| {
            let authors = AuthorRepository::new(conn);
            let total = authors.count()?;
            request.ensure_in_range(total)?;
            Ok(Page {
                items: authors.list(request)?,
                total,
                request,
            })
        })
    }

    /// Replace (`Mode::Full`) or patch (`Mode::Partial`) an author.
    ///
    /// Submissions that carry nested quotes are refused; quotes are only
    /// edited through the quote operations.
    pub fn update_author(&self, id: i64, data: &Map<String, Value>, mode: Mode) -> Result<Author> {
        self.db.transaction(|tx| {
            let mut author = existing_author(tx, id)?;
            let changes = validation::author_changes(data, mode)?;
            if changes.quotes.is_some() {
                return Err(QuotebookError::QuotesEditedViaAuthor);
            }

            if let Some(name) = changes.name {
                author.name = name;
            }
            if let Some(date_of_birth) = changes.date_of_birth {
                author.date_of_birth = date_of_birth;
            }
            if let Some(date_of_death) = changes.date_of_death {
                author.date_of_death = date_of_death;
            }
            author.updated_at = Some(now());

            AuthorRepository::new(tx).update(&author)?;
            debug!(author_id = id, ?mode, "Author updated");
            Ok(author)
        })
    }

    /// Delete an author and every quote it owns.
    pub fn delete_author(&self, id: i64) -> Result<()> {
        self.db.transaction(|tx| {
            existing_author(tx, id)?;
            let removed = QuoteRepository::new(tx).delete_by_author(id)?;
            AuthorRepository::new(tx).delete(id)?;
            debug!(author_id = id, quotes_removed = removed, "Author deleted");
            Ok(())
        })
    }

    // =========================================================================
    // Quotes
    // =========================================================================

    /// Create a quote, creating its author by name if none exists yet.
    pub fn create_quote(&self, data: &Map<String, Value>) -> Result<Quote> {
        let new = validation::new_quote(data)?;
        self.db.transaction(|tx| insert_quote(tx, &new))
    }

    /// Create a quote owned by the author at `author_id`.
    ///
    /// Any `author` in the submission is replaced by the path author.
    pub fn create_author_quote(&self, author_id: i64, data: &Map<String, Value>) -> Result<Quote> {
        self.db.transaction(|tx| {
            let author = existing_author(tx, author_id)?;
            let mut data = data.clone();
            data.insert(
                "author".to_string(),
                json!({"id": author.id, "name": author.name}),
            );
            let new = validation::new_quote(&data)?;
            insert_quote(tx, &new)
        })
    }

    pub fn read_quote(&self, id: i64) -> Result<Quote> {
        self.db.with_conn(|conn| existing_quote(conn, id))
    }

    /// A window of all quotes in insertion order, with the total count.
    pub fn list_quotes(&self, request: PageRequest) -> Result<Page<Quote>> {
        self.db.with_conn(|conn| {
            let quotes = QuoteRepository::new(conn);
            let total = quotes.count()?;
            request.ensure_in_range(total)?;
            Ok(Page {
                items: quotes.list(request)?,
                total,
                request,
            })
        })
    }

    /// A window of one author's quotes.
    pub fn list_author_quotes(&self, author_id: i64, request: PageRequest) -> Result<Page<Quote>> {
        self.db.with_conn(|conn| {
            existing_author(conn, author_id)?;
            let quotes = QuoteRepository::new(conn);
            let total = quotes.count_by_author(author_id)?;
            request.ensure_in_range(total)?;
            Ok(Page {
                items: quotes.list_by_author(author_id, request)?,
                total,
                request,
            })
        })
    }

    /// Replace (`Mode::Full`) or patch (`Mode::Partial`) a quote.
    ///
    /// The nested author may be repeated as-is but never changed; a quote
    /// is moved to another author only through the author operations.
    pub fn update_quote(&self, id: i64, data: &Map<String, Value>, mode: Mode) -> Result<Quote> {
        self.db.transaction(|tx| {
            let mut quote = existing_quote(tx, id)?;
            let changes = validation::quote_changes(data, mode)?;

            if let Some(author) = &changes.author {
                let renamed = author.name != quote.author.name;
                let moved = author.id.is_some_and(|author_id| author_id != quote.author.id);
                if renamed || moved {
                    return Err(QuotebookError::AuthorEditedViaQuote);
                }
            }

            if let Some(content) = changes.content {
                quote.content = content;
            }
            if let Some(context) = changes.context {
                quote.context = context;
            }
            quote.updated_at = Some(now());

            QuoteRepository::new(tx).update(&quote)?;
            debug!(quote_id = id, ?mode, "Quote updated");
            Ok(quote)
        })
    }

    pub fn delete_quote(&self, id: i64) -> Result<()> {
        self.db.transaction(|tx| {
            existing_quote(tx, id)?;
            QuoteRepository::new(tx).delete(id)?;
            debug!(quote_id = id, "Quote deleted");
            Ok(())
        })
    }
}

/// Resolve the author by name (creating it if needed) and insert the quote.
fn insert_quote(conn: &Connection, new: &NewQuote) -> Result<Quote> {
    let now = now();
    let authors = AuthorRepository::new(conn);

    let created = authors.insert_if_absent(&new.author.name, now)?;
    let author = authors
        .find_by_name(&new.author.name)?
        .ok_or_else(|| QuotebookError::Storage("Author vanished during quote creation".to_string()))?;
    if created {
        debug!(author_id = author.id, "Author created implicitly for quote");
    }

    let quotes = QuoteRepository::new(conn);
    let id = quotes.insert(&new.content, author.id, new.context.as_deref(), now)?;
    debug!(quote_id = id, author_id = author.id, "Quote created");

    existing_quote(conn, id)
}

fn existing_author(conn: &Connection, id: i64) -> Result<Author> {
    AuthorRepository::new(conn)
        .find_by_id(id)?
        .ok_or(QuotebookError::NotFound {
            entity: EntityKind::Author,
            id,
        })
}

fn existing_quote(conn: &Connection, id: i64) -> Result<Quote> {
    QuoteRepository::new(conn)
        .find_by_id(id)?
        .ok_or(QuotebookError::NotFound {
            entity: EntityKind::Quote,
            id,
        })
}

/// Current time at the store's one-second resolution, so that returned
/// entities compare equal to what a later read produces.
fn now() -> DateTime<Utc> {
    Utc.timestamp_opt(Utc::now().timestamp(), 0)
        .single()
        .unwrap_or_default()
}
