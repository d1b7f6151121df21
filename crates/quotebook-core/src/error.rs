use thiserror::Error;

use crate::validation::ValidationErrors;

/// The entity a lookup or constraint refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Author,
    Quote,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Author => write!(f, "author"),
            EntityKind::Quote => write!(f, "quote"),
        }
    }
}

/// Transport-independent classification of an error.
///
/// The HTTP layer maps each kind onto a status code; nothing below the
/// endpoint layer knows about status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ValidationFailure,
    DuplicateEntity,
    Forbidden,
    NoDataSubmitted,
    BadRequest,
    Internal,
}

/// Top-level error type for the Quotebook system.
///
/// Domain variants are returned by the CRUD operations and carry enough
/// context to build a client-facing message. Infrastructure variants
/// (`Config`, `Storage`, `Io`, `Serialization`) are never shown to clients
/// verbatim.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuotebookError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Sorry, that {entity} doesn't exist yet!")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("No data on that page!")]
    PageNotFound,

    #[error("Schema validation failed")]
    Validation(ValidationErrors),

    #[error("That author already exists!")]
    DuplicateAuthor { name: String },

    #[error("That quote already exists!")]
    DuplicateQuote,

    #[error(
        "Sorry, it looks like you tried to create or edit quotes while updating an author. \
         You have to use the quotes endpoint for that!"
    )]
    QuotesEditedViaAuthor,

    #[error(
        "Sorry, it looks like you tried to create or edit an author while updating a quote. \
         You have to use the authors endpoint for that!"
    )]
    AuthorEditedViaQuote,

    #[error("You didn't submit any JSON data!")]
    NoData,

    #[error("The submitted body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("Invalid query parameter: {0}")]
    InvalidParameter(String),
}

impl QuotebookError {
    /// Classify this error for the transport layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuotebookError::NotFound { .. } | QuotebookError::PageNotFound => ErrorKind::NotFound,
            QuotebookError::Validation(_) => ErrorKind::ValidationFailure,
            QuotebookError::DuplicateAuthor { .. } | QuotebookError::DuplicateQuote => {
                ErrorKind::DuplicateEntity
            }
            QuotebookError::QuotesEditedViaAuthor | QuotebookError::AuthorEditedViaQuote => {
                ErrorKind::Forbidden
            }
            QuotebookError::NoData => ErrorKind::NoDataSubmitted,
            QuotebookError::MalformedBody(_) | QuotebookError::InvalidParameter(_) => {
                ErrorKind::BadRequest
            }
            QuotebookError::Config(_)
            | QuotebookError::Storage(_)
            | QuotebookError::Io(_)
            | QuotebookError::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Machine-readable error name carried in JSON error bodies.
    pub fn error_name(&self) -> &'static str {
        match self {
            QuotebookError::NotFound { .. } => "EntityDoesNotExistError",
            QuotebookError::PageNotFound => "PageNotFound",
            QuotebookError::Validation(_) => "SchemaValidationError",
            QuotebookError::DuplicateAuthor { .. } => "AuthorAlreadyExistsError",
            QuotebookError::DuplicateQuote => "QuoteAlreadyExistsError",
            QuotebookError::QuotesEditedViaAuthor => "CanNotCreateOrEditQuotesFromAuthorUpdate",
            QuotebookError::AuthorEditedViaQuote => "CanNotCreateOrEditAuthorsFromQuoteUpdate",
            QuotebookError::NoData => "NoDataError",
            QuotebookError::MalformedBody(_) => "MalformedJsonError",
            QuotebookError::InvalidParameter(_) => "InvalidParameterError",
            QuotebookError::Config(_)
            | QuotebookError::Storage(_)
            | QuotebookError::Io(_)
            | QuotebookError::Serialization(_) => "InternalServerError",
        }
    }
}

impl From<toml::de::Error> for QuotebookError {
    fn from(err: toml::de::Error) -> Self {
        QuotebookError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for QuotebookError {
    fn from(err: toml::ser::Error) -> Self {
        QuotebookError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for QuotebookError {
    fn from(err: serde_json::Error) -> Self {
        QuotebookError::Serialization(err.to_string())
    }
}

impl From<ValidationErrors> for QuotebookError {
    fn from(errors: ValidationErrors) -> Self {
        QuotebookError::Validation(errors)
    }
}

/// A specialized `Result` type for Quotebook operations.
pub type Result<T> = std::result::Result<T, QuotebookError>;
