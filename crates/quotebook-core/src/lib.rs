//! Quotebook core crate - domain types, errors, validation, pagination
//! and configuration shared by the storage and API crates.

pub mod config;
pub mod error;
pub mod pagination;
pub mod types;
pub mod validation;

pub use config::QuotebookConfig;
pub use error::{EntityKind, ErrorKind, QuotebookError, Result};
pub use pagination::{Page, PageRequest};
pub use types::*;
pub use validation::{Mode, ValidationErrors};
