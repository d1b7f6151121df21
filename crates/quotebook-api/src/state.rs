//! Application state shared across all route handlers.
//!
//! AppState is built once at startup and passed to handlers via axum's
//! State extractor.

use std::sync::Arc;
use std::time::Instant;

use quotebook_core::config::PaginationConfig;
use quotebook_core::pagination::PageRequest;
use quotebook_storage::{CrudService, Database};

/// Shared application state.
///
/// All fields are cheap to clone across handler tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// SQLite database, used directly for health checks.
    pub database: Arc<Database>,
    /// CRUD operations over the same database.
    pub crud: Arc<CrudService>,
    /// Default and maximum page sizes for list endpoints.
    pub pagination: PaginationConfig,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(database: Database, pagination: PaginationConfig) -> Self {
        let database = Arc::new(database);
        Self {
            crud: Arc::new(CrudService::new(Arc::clone(&database))),
            database,
            pagination,
            start_time: Instant::now(),
        }
    }

    /// Build a page request from parsed query parameters and the configured
    /// limits.
    pub fn page_request(&self, limit: Option<u64>, offset: Option<u64>) -> PageRequest {
        PageRequest::with_limits(
            limit,
            offset,
            self.pagination.default_limit,
            self.pagination.max_limit,
        )
    }
}
