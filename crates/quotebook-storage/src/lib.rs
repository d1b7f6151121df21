//! Quotebook Storage crate - SQLite persistence for authors and quotes.
//!
//! Provides a WAL-mode SQLite database with migrations, row-level
//! repositories, and the transactional CRUD service the API layer calls.

pub mod crud;
pub mod db;
pub mod migrations;
pub mod repository;

pub use crud::CrudService;
pub use db::Database;
pub use repository::{AuthorRepository, QuoteRepository};
