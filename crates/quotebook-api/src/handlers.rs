//! Route handler functions for all API endpoints.
//!
//! Each handler extracts path/query parameters and the JSON submission via
//! axum extractors, calls the CRUD service, and projects the result.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use quotebook_core::pagination::PageRequest;
use quotebook_core::validation::Mode;

use crate::error::{ApiError, ErrorBody};
use crate::extract::{ListParams, Path, Query, Submission};
use crate::schemas::{
    author_quotes_url, AuthorResponse, ListResponse, MiniAuthor, MiniQuote, QuoteResponse,
};
use crate::state::AppState;

type Created<T> = (StatusCode, Json<T>);

fn page_request(state: &AppState, params: &ListParams) -> Result<PageRequest, ApiError> {
    Ok(state.page_request(params.limit()?, params.offset()?))
}

// =============================================================================
// Service endpoints
// =============================================================================

/// GET / - the layout of the API.
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses((status = 200, description = "Collection layout", body = std::collections::HashMap<String, String>))
)]
pub async fn root() -> Json<Value> {
    Json(json!({
        "authors": "/authors{/id}",
        "quotes": "/quotes{/id}",
    }))
}

/// GET /-/alive
#[utoipa::path(
    get,
    path = "/-/alive",
    tag = "service",
    responses((status = 204, description = "The process is up"))
)]
pub async fn alive() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET /-/healthy - 204 while the store answers queries.
#[utoipa::path(
    get,
    path = "/-/healthy",
    tag = "service",
    responses(
        (status = 204, description = "The database answers queries"),
        (status = 503, description = "The database is not responding", body = ErrorBody)
    )
)]
pub async fn healthy(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.database.ping().map_err(|e| {
        tracing::warn!(error = %e, "Health check failed");
        ApiError::ServiceUnavailable("The database is not responding".to_string())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Authors
// =============================================================================

/// GET /authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(ListParams),
    responses(
        (status = 200, description = "One page of authors", body = ListResponse<MiniAuthor>),
        (status = 400, description = "Bad query parameter", body = ErrorBody),
        (status = 404, description = "No data on that page", body = ErrorBody)
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<MiniAuthor>>, ApiError> {
    let request = page_request(&state, &params)?;
    let page = state.crud.list_authors(request)?;
    Ok(Json(ListResponse::from_page(page, "/authors")))
}

/// POST /authors
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body(content = AuthorResponse, description = "An author, optionally with a `quotes` array"),
    responses(
        (status = 201, description = "Created", body = AuthorResponse),
        (status = 400, description = "No data, malformed JSON, duplicate entity or bad parameter", body = ErrorBody),
        (status = 413, description = "Body over the size limit", body = ErrorBody),
        (status = 422, description = "Schema validation failed", body = ErrorBody)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    Submission(data): Submission,
) -> Result<Created<AuthorResponse>, ApiError> {
    let author = state.crud.create_author(&data)?;
    Ok((StatusCode::CREATED, Json(author.into())))
}

/// GET /authors/{id}
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author id")),
    responses(
        (status = 200, description = "Found", body = AuthorResponse),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such entity", body = ErrorBody)
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AuthorResponse>, ApiError> {
    Ok(Json(state.crud.read_author(id)?.into()))
}

/// PUT /authors/{id}
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author id")),
    request_body(content = AuthorResponse, description = "Every writable field"),
    responses(
        (status = 200, description = "Updated", body = AuthorResponse),
        (status = 400, description = "No data, malformed JSON, duplicate entity or cross-entity edit", body = ErrorBody),
        (status = 404, description = "No such entity", body = ErrorBody),
        (status = 413, description = "Body over the size limit", body = ErrorBody),
        (status = 422, description = "Schema validation failed", body = ErrorBody)
    )
)]
pub async fn replace_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Submission(data): Submission,
) -> Result<Json<AuthorResponse>, ApiError> {
    Ok(Json(state.crud.update_author(id, &data, Mode::Full)?.into()))
}

/// PATCH /authors/{id}
#[utoipa::path(
    patch,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author id")),
    request_body(content = AuthorResponse, description = "Any subset of the writable fields"),
    responses(
        (status = 200, description = "Updated", body = AuthorResponse),
        (status = 400, description = "No data, malformed JSON, duplicate entity or cross-entity edit", body = ErrorBody),
        (status = 404, description = "No such entity", body = ErrorBody),
        (status = 413, description = "Body over the size limit", body = ErrorBody),
        (status = 422, description = "Schema validation failed", body = ErrorBody)
    )
)]
pub async fn patch_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Submission(data): Submission,
) -> Result<Json<AuthorResponse>, ApiError> {
    Ok(Json(state.crud.update_author(id, &data, Mode::Partial)?.into()))
}

/// DELETE /authors/{id}
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author id")),
    responses(
        (status = 204, description = "Deleted along with its quotes"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such entity", body = ErrorBody)
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.crud.delete_author(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /authors/{id}/quotes
#[utoipa::path(
    get,
    path = "/authors/{id}/quotes",
    tag = "authors",
    params(("id" = i64, Path, description = "Author id"), ListParams),
    responses(
        (status = 200, description = "One page of the author's quotes", body = ListResponse<MiniQuote>),
        (status = 400, description = "Bad path or query parameter", body = ErrorBody),
        (status = 404, description = "No such author, or no data on that page", body = ErrorBody)
    )
)]
pub async fn list_author_quotes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<MiniQuote>>, ApiError> {
    let request = page_request(&state, &params)?;
    let page = state.crud.list_author_quotes(id, request)?;
    Ok(Json(ListResponse::from_page(page, &author_quotes_url(id))))
}

/// POST /authors/{id}/quotes
#[utoipa::path(
    post,
    path = "/authors/{id}/quotes",
    tag = "authors",
    params(("id" = i64, Path, description = "Author id")),
    request_body(content = QuoteResponse, description = "A quote; any `author` is replaced by the path author"),
    responses(
        (status = 201, description = "Created", body = QuoteResponse),
        (status = 400, description = "No data, malformed JSON, duplicate entity or bad parameter", body = ErrorBody),
        (status = 404, description = "No such author", body = ErrorBody),
        (status = 413, description = "Body over the size limit", body = ErrorBody),
        (status = 422, description = "Schema validation failed", body = ErrorBody)
    )
)]
pub async fn create_author_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Submission(data): Submission,
) -> Result<Created<QuoteResponse>, ApiError> {
    let quote = state.crud.create_author_quote(id, &data)?;
    Ok((StatusCode::CREATED, Json(quote.into())))
}

// =============================================================================
// Quotes
// =============================================================================

/// GET /quotes
#[utoipa::path(
    get,
    path = "/quotes",
    tag = "quotes",
    params(ListParams),
    responses(
        (status = 200, description = "One page of quotes", body = ListResponse<MiniQuote>),
        (status = 400, description = "Bad query parameter", body = ErrorBody),
        (status = 404, description = "No data on that page", body = ErrorBody)
    )
)]
pub async fn list_quotes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<MiniQuote>>, ApiError> {
    let request = page_request(&state, &params)?;
    let page = state.crud.list_quotes(request)?;
    Ok(Json(ListResponse::from_page(page, "/quotes")))
}

/// POST /quotes
#[utoipa::path(
    post,
    path = "/quotes",
    tag = "quotes",
    request_body(content = QuoteResponse, description = "A quote; its author is created if needed"),
    responses(
        (status = 201, description = "Created", body = QuoteResponse),
        (status = 400, description = "No data, malformed JSON, duplicate entity or bad parameter", body = ErrorBody),
        (status = 413, description = "Body over the size limit", body = ErrorBody),
        (status = 422, description = "Schema validation failed", body = ErrorBody)
    )
)]
pub async fn create_quote(
    State(state): State<AppState>,
    Submission(data): Submission,
) -> Result<Created<QuoteResponse>, ApiError> {
    let quote = state.crud.create_quote(&data)?;
    Ok((StatusCode::CREATED, Json(quote.into())))
}

/// GET /quotes/{id}
#[utoipa::path(
    get,
    path = "/quotes/{id}",
    tag = "quotes",
    params(("id" = i64, Path, description = "Quote id")),
    responses(
        (status = 200, description = "Found", body = QuoteResponse),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such entity", body = ErrorBody)
    )
)]
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<QuoteResponse>, ApiError> {
    Ok(Json(state.crud.read_quote(id)?.into()))
}

/// PUT /quotes/{id}
#[utoipa::path(
    put,
    path = "/quotes/{id}",
    tag = "quotes",
    params(("id" = i64, Path, description = "Quote id")),
    request_body(content = QuoteResponse, description = "Every writable field"),
    responses(
        (status = 200, description = "Updated", body = QuoteResponse),
        (status = 400, description = "No data, malformed JSON, duplicate entity or cross-entity edit", body = ErrorBody),
        (status = 404, description = "No such entity", body = ErrorBody),
        (status = 413, description = "Body over the size limit", body = ErrorBody),
        (status = 422, description = "Schema validation failed", body = ErrorBody)
    )
)]
pub async fn replace_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Submission(data): Submission,
) -> Result<Json<QuoteResponse>, ApiError> {
    Ok(Json(state.crud.update_quote(id, &data, Mode::Full)?.into()))
}

/// PATCH /quotes/{id}
#[utoipa::path(
    patch,
    path = "/quotes/{id}",
    tag = "quotes",
    params(("id" = i64, Path, description = "Quote id")),
    request_body(content = QuoteResponse, description = "Any subset of the writable fields"),
    responses(
        (status = 200, description = "Updated", body = QuoteResponse),
        (status = 400, description = "No data, malformed JSON, duplicate entity or cross-entity edit", body = ErrorBody),
        (status = 404, description = "No such entity", body = ErrorBody),
        (status = 413, description = "Body over the size limit", body = ErrorBody),
        (status = 422, description = "Schema validation failed", body = ErrorBody)
    )
)]
pub async fn patch_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Submission(data): Submission,
) -> Result<Json<QuoteResponse>, ApiError> {
    Ok(Json(state.crud.update_quote(id, &data, Mode::Partial)?.into()))
}

/// DELETE /quotes/{id}
#[utoipa::path(
    delete,
    path = "/quotes/{id}",
    tag = "quotes",
    params(("id" = i64, Path, description = "Quote id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such entity", body = ErrorBody)
    )
)]
pub async fn delete_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.crud.delete_quote(id)?;
    Ok(StatusCode::NO_CONTENT)
}
