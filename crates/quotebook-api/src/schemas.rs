//! Response projections.
//!
//! Each entity has a full projection and a minimal reference projection.
//! Quote embeds the minimal author; Author links to its quotes collection
//! instead of embedding them. List endpoints return minimal items.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use quotebook_core::pagination::{Page, PageRequest};
use quotebook_core::types::{Author, AuthorSummary, Quote};

pub fn author_url(id: i64) -> String {
    format!("/authors/{}", id)
}

pub fn author_quotes_url(id: i64) -> String {
    format!("/authors/{}/quotes", id)
}

pub fn quote_url(id: i64) -> String {
    format!("/quotes/{}", id)
}

/// Full author projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = Author)]
pub struct AuthorResponse {
    #[schema(read_only)]
    pub id: i64,
    #[schema(max_length = 80)]
    pub name: String,
    #[schema(read_only)]
    pub url: String,
    /// Link to this author's quotes collection.
    #[schema(read_only)]
    pub quotes: String,
    #[schema(read_only)]
    pub posted_at: DateTime<Utc>,
    #[schema(read_only)]
    pub updated_at: Option<DateTime<Utc>>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        Self {
            url: author_url(author.id),
            quotes: author_quotes_url(author.id),
            id: author.id,
            name: author.name,
            posted_at: author.posted_at,
            updated_at: author.updated_at,
            date_of_birth: author.date_of_birth,
            date_of_death: author.date_of_death,
        }
    }
}

/// Author reference, used inside quotes and author lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MiniAuthor {
    pub id: i64,
    #[schema(max_length = 80)]
    pub name: String,
    #[schema(read_only)]
    pub url: String,
}

impl From<AuthorSummary> for MiniAuthor {
    fn from(author: AuthorSummary) -> Self {
        Self {
            url: author_url(author.id),
            id: author.id,
            name: author.name,
        }
    }
}

impl From<Author> for MiniAuthor {
    fn from(author: Author) -> Self {
        author.summary().into()
    }
}

/// Full quote projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = Quote)]
pub struct QuoteResponse {
    #[schema(read_only)]
    pub id: i64,
    pub author: MiniAuthor,
    pub content: String,
    #[schema(read_only)]
    pub url: String,
    #[schema(read_only)]
    pub posted_at: DateTime<Utc>,
    #[schema(read_only)]
    pub updated_at: Option<DateTime<Utc>>,
    #[schema(max_length = 500)]
    pub context: Option<String>,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            url: quote_url(quote.id),
            id: quote.id,
            author: quote.author.into(),
            content: quote.content,
            posted_at: quote.posted_at,
            updated_at: quote.updated_at,
            context: quote.context,
        }
    }
}

/// Quote reference, used inside quote lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MiniQuote {
    #[schema(read_only)]
    pub id: i64,
    pub content: String,
    #[schema(read_only)]
    pub url: String,
}

impl From<Quote> for MiniQuote {
    fn from(quote: Quote) -> Self {
        Self {
            url: quote_url(quote.id),
            id: quote.id,
            content: quote.content,
        }
    }
}

/// Paginated list body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    /// Relative link to the following window, absent on the last page.
    pub next_page: Option<String>,
    pub limit: u64,
    pub offset: u64,
    pub total: u64,
}

impl<T> ListResponse<T> {
    /// Build a list body for the collection at `path`.
    pub fn from_page<E>(page: Page<E>, path: &str) -> Self
    where
        T: From<E>,
    {
        let next_page = page.next().map(|next| page_link(path, next));
        let PageRequest { limit, offset } = page.request;
        Self {
            items: page.items.into_iter().map(T::from).collect(),
            next_page,
            limit,
            offset,
            total: page.total,
        }
    }
}

fn page_link(path: &str, request: PageRequest) -> String {
    format!("{}?limit={}&offset={}", path, request.limit, request.offset)
}
