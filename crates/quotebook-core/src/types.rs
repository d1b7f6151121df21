//! Core domain types for stored entities.
//!
//! These are the rows as the entity store hands them back. Response shapes
//! (full, reference, list-item) are built from them by the API layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A stored author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Store-assigned identifier, immutable once assigned.
    pub id: i64,
    /// Globally unique display name.
    pub name: String,
    /// When the author was created.
    pub posted_at: DateTime<Utc>,
    /// When the author was last updated, if ever.
    pub updated_at: Option<DateTime<Utc>>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// The minimal reference used when embedding this author elsewhere.
    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Identifier and name of an author, as joined onto a quote row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: i64,
    pub name: String,
}

/// A stored quote together with its owning author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Store-assigned identifier, immutable once assigned.
    pub id: i64,
    /// Quote text; unique per author.
    pub content: String,
    /// The single owning author.
    pub author: AuthorSummary,
    /// When the quote was created.
    pub posted_at: DateTime<Utc>,
    /// When the quote was last updated, if ever.
    pub updated_at: Option<DateTime<Utc>>,
    /// Free-form context (where or when it was said).
    pub context: Option<String>,
}
