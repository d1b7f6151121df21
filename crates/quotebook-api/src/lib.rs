//! Quotebook API crate - axum HTTP server, route handlers, projections.
//!
//! Provides the REST API over authors and quotes: CRUD endpoints with
//! pagination, health checks, and the OpenAPI document.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod schemas;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
