//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping domain errors to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use quotebook_core::error::{ErrorKind, QuotebookError};

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error name (e.g., "EntityDoesNotExistError").
    pub error_name: String,
    /// Human-readable error message.
    pub message: String,
    /// HTTP status code, repeated in the body.
    pub response_code: u16,
    /// Per-field validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - duplicates, forbidden cross-entity edits, missing or
    /// malformed bodies and bad query parameters.
    BadRequest { name: &'static str, message: String },
    /// 404 Not Found - entity or page does not exist.
    NotFound { name: &'static str, message: String },
    /// 413 Payload Too Large - body over the configured limit.
    PayloadTooLarge(String),
    /// 422 Unprocessable Entity - schema validation failure.
    UnprocessableEntity { message: String, details: Value },
    /// 500 Internal Server Error - unexpected server error.
    Internal,
    /// 503 Service Unavailable - the store is not answering.
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_name, message, details) = match self {
            ApiError::BadRequest { name, message } => (name, message, None),
            ApiError::NotFound { name, message } => (name, message, None),
            ApiError::PayloadTooLarge(message) => ("PayloadTooLargeError", message, None),
            ApiError::UnprocessableEntity { message, details } => {
                ("SchemaValidationError", message, Some(details))
            }
            ApiError::Internal => ("InternalServerError", INTERNAL_MESSAGE.to_string(), None),
            ApiError::ServiceUnavailable(message) => ("ServiceUnavailable", message, None),
        };

        let body = ErrorBody {
            error_name: error_name.to_string(),
            message,
            response_code: status.as_u16(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<QuotebookError> for ApiError {
    fn from(err: QuotebookError) -> Self {
        let name = err.error_name();
        match err.kind() {
            ErrorKind::NotFound => ApiError::NotFound {
                name,
                message: err.to_string(),
            },
            ErrorKind::ValidationFailure => {
                let details = match &err {
                    QuotebookError::Validation(errors) => {
                        serde_json::to_value(errors).unwrap_or(Value::Null)
                    }
                    _ => Value::Null,
                };
                ApiError::UnprocessableEntity {
                    message: err.to_string(),
                    details,
                }
            }
            ErrorKind::DuplicateEntity
            | ErrorKind::Forbidden
            | ErrorKind::NoDataSubmitted
            | ErrorKind::BadRequest => ApiError::BadRequest {
                name,
                message: err.to_string(),
            },
            ErrorKind::Internal => {
                tracing::error!(error = %err, "Request failed with internal error");
                ApiError::Internal
            }
        }
    }
}
