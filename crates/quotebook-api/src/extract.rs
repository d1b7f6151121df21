//! Request extractors: JSON submissions, path ids and query parameters.
//!
//! Every rejection is an [`ApiError`], so clients always get the JSON error
//! body instead of axum's plain-text rejections.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::IntoParams;

use quotebook_core::error::QuotebookError;
use quotebook_core::validation;

use crate::error::ApiError;

/// A request body that decoded to a non-empty JSON object.
///
/// An absent or whitespace-only body, `null`, `{}` and `[]` are rejected as
/// `NoData`. The content type is not checked.
#[derive(Debug, Clone)]
pub struct Submission(pub Map<String, Value>);

impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge(rejection.body_text())
            } else {
                ApiError::from(QuotebookError::MalformedBody(rejection.body_text()))
            }
        })?;
        parse_submission(&bytes).map(Submission).map_err(ApiError::from)
    }
}

fn parse_submission(bytes: &[u8]) -> Result<Map<String, Value>, QuotebookError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(QuotebookError::NoData);
    }
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| QuotebookError::MalformedBody(e.to_string()))?;
    validation::as_submission(value)
}

/// Path parameters. A segment that does not deserialize (e.g. `/authors/abc`)
/// is an `InvalidParameterError`.
#[derive(Debug, Clone, Copy)]
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(Path(value)),
            Err(rejection) => Err(parameter_rejection(rejection.status(), rejection.body_text())),
        }
    }
}

/// Query string parameters. Undecodable strings and repeated keys are an
/// `InvalidParameterError`.
#[derive(Debug, Clone, Default)]
pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Query(value)) => Ok(Query(value)),
            Err(rejection) => Err(parameter_rejection(rejection.status(), rejection.body_text())),
        }
    }
}

/// Client-side rejections are the caller's fault; anything else (a route
/// registered without its `{id}` segment) is a server bug.
fn parameter_rejection(status: StatusCode, message: String) -> ApiError {
    if status.is_client_error() {
        ApiError::from(QuotebookError::InvalidParameter(message))
    } else {
        tracing::error!(%status, %message, "Parameter extraction failed");
        ApiError::Internal
    }
}

/// `limit` and `offset` query parameters of the list endpoints.
///
/// Kept as raw strings so that bad values produce a JSON error body rather
/// than axum's plain-text query rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Maximum number of items to return; clamped to the configured maximum.
    #[param(value_type = Option<u64>, minimum = 1)]
    pub limit: Option<String>,
    /// Number of items to skip.
    #[param(value_type = Option<u64>, minimum = 0)]
    pub offset: Option<String>,
}

impl ListParams {
    pub fn limit(&self) -> Result<Option<u64>, QuotebookError> {
        parse_count("limit", self.limit.as_deref())
    }

    pub fn offset(&self) -> Result<Option<u64>, QuotebookError> {
        parse_count("offset", self.offset.as_deref())
    }
}

fn parse_count(name: &str, raw: Option<&str>) -> Result<Option<u64>, QuotebookError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<u64>().map(Some).map_err(|_| {
            QuotebookError::InvalidParameter(format!(
                "{} must be a non-negative integer, got '{}'",
                name, value
            ))
        }),
    }
}
