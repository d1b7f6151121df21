//! Integration tests for the Quotebook API.
//!
//! Drives the full router in-process: every route, status code mapping,
//! error bodies, pagination links, and request body handling. Each test is
//! independent with its own in-memory database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use quotebook_api::create_router;
use quotebook_api::error::ErrorBody;
use quotebook_api::schemas::{AuthorResponse, ListResponse, MiniAuthor, MiniQuote, QuoteResponse};
use quotebook_api::state::AppState;
use quotebook_core::config::PaginationConfig;
use quotebook_storage::Database;

// =============================================================================
// Helpers
// =============================================================================

fn make_app() -> axum::Router {
    create_router(AppState::new(
        Database::in_memory().unwrap(),
        PaginationConfig::default(),
    ))
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

fn with_body(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_json(method: &str, uri: &str, value: Value) -> Request<Body> {
    with_body(method, uri, &value.to_string())
}

/// Read full response body bytes.
async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    (status, body_bytes(resp).await)
}

async fn send_json<T: serde::de::DeserializeOwned>(
    app: &axum::Router,
    req: Request<Body>,
) -> (StatusCode, T) {
    let (status, bytes) = send(app, req).await;
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("bad body {:?}: {}", String::from_utf8_lossy(&bytes), e));
    (status, body)
}

async fn create_author(app: &axum::Router, name: &str) -> AuthorResponse {
    let (status, author) =
        send_json(app, with_json("POST", "/authors", json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    author
}

async fn create_quote(app: &axum::Router, content: &str, author: &str) -> QuoteResponse {
    let (status, quote) = send_json(
        app,
        with_json(
            "POST",
            "/quotes",
            json!({"content": content, "author": {"name": author}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    quote
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_root_layout() {
    let app = make_app();
    let (status, body): (_, Value) = send_json(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"authors": "/authors{/id}", "quotes": "/quotes{/id}"}));
}

#[tokio::test]
async fn test_alive_and_healthy() {
    let app = make_app();
    let (status, body) = send(&app, get("/-/alive")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _) = send(&app, get("/-/healthy")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_spec_and_docs() {
    let app = make_app();
    let (status, spec): (_, Value) = send_json(&app, get("/spec")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(spec["openapi"], "3.1.0");
    assert!(spec["paths"]["/authors"]["post"]["responses"]["413"].is_object());
    assert!(spec["components"]["schemas"]["MiniQuote"]["required"]
        .as_array()
        .unwrap()
        .contains(&json!("content")));

    let resp = app.clone().oneshot(get("/docs")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let html = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(html.contains("/spec"));
}

// =============================================================================
// Authors
// =============================================================================

#[tokio::test]
async fn test_create_and_read_author() {
    let app = make_app();
    let (status, created): (_, AuthorResponse) = send_json(
        &app,
        with_json(
            "POST",
            "/authors",
            json!({"name": "Mary Shelley", "date_of_birth": "1797-08-30"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.name, "Mary Shelley");
    assert_eq!(created.url, format!("/authors/{}", created.id));
    assert_eq!(created.quotes, format!("/authors/{}/quotes", created.id));
    assert!(created.updated_at.is_none());

    let (status, fetched): (_, AuthorResponse) =
        send_json(&app, get(&format!("/authors/{}", created.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_author_with_quotes() {
    let app = make_app();
    let (status, created): (_, AuthorResponse) = send_json(
        &app,
        with_json(
            "POST",
            "/authors",
            json!({
                "name": "Mark Twain",
                "quotes": [
                    {"content": "Get your facts first."},
                    {"content": "Courage is resistance to fear.", "context": "Pudd'nhead Wilson"}
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, list): (_, ListResponse<MiniQuote>) = send_json(&app, get(&created.quotes)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.total, 2);
    assert_eq!(list.items[0].content, "Get your facts first.");
}

#[tokio::test]
async fn test_duplicate_author() {
    let app = make_app();
    create_author(&app, "Homer").await;
    let (status, err): (_, ErrorBody) =
        send_json(&app, with_json("POST", "/authors", json!({"name": "Homer"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error_name, "AuthorAlreadyExistsError");
    assert_eq!(err.response_code, 400);
}

#[tokio::test]
async fn test_create_author_validation_errors() {
    let app = make_app();
    let (status, err): (_, ErrorBody) = send_json(
        &app,
        with_json(
            "POST",
            "/authors",
            json!({"name": "   ", "date_of_birth": "yesterday", "quotes": [{"context": "x"}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.error_name, "SchemaValidationError");
    let details = err.details.unwrap();
    assert!(details.get("name").is_some());
    assert!(details.get("date_of_birth").is_some());
    assert!(details.get("quotes.0.content").is_some());
}

#[tokio::test]
async fn test_author_name_length_limit() {
    let app = make_app();
    let (status, err): (_, ErrorBody) = send_json(
        &app,
        with_json("POST", "/authors", json!({ "name": "x".repeat(81) })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.details.unwrap()["name"][0], "Longer than maximum length 80.");
}

#[tokio::test]
async fn test_read_missing_author() {
    let app = make_app();
    let (status, err): (_, ErrorBody) = send_json(&app, get("/authors/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err.error_name, "EntityDoesNotExistError");
    assert_eq!(err.response_code, 404);
}

#[tokio::test]
async fn test_put_and_patch_author() {
    let app = make_app();
    let created = create_author(&app, "Tolstoy").await;
    let uri = format!("/authors/{}", created.id);

    let (status, replaced): (_, AuthorResponse) = send_json(
        &app,
        with_json("PUT", &uri, json!({"name": "Leo Tolstoy", "date_of_death": "1910-11-20"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced.name, "Leo Tolstoy");
    assert!(replaced.updated_at.is_some());

    let (status, patched): (_, AuthorResponse) = send_json(
        &app,
        with_json("PATCH", &uri, json!({"date_of_birth": "1828-09-09"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched.name, "Leo Tolstoy");
    assert_eq!(patched.date_of_death, replaced.date_of_death);

    let (status, _): (_, ErrorBody) =
        send_json(&app, with_json("PUT", &uri, json!({"date_of_birth": "1828-09-09"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_author_with_quotes_forbidden() {
    let app = make_app();
    let created = create_author(&app, "Tolstoy").await;
    let (status, err): (_, ErrorBody) = send_json(
        &app,
        with_json(
            "PATCH",
            &format!("/authors/{}", created.id),
            json!({"quotes": [{"content": "All happy families are alike."}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error_name, "CanNotCreateOrEditQuotesFromAuthorUpdate");
}

#[tokio::test]
async fn test_delete_author_removes_quotes() {
    let app = make_app();
    let quote = create_quote(&app, "Know thyself.", "Socrates").await;

    let (status, body) = send(&app, delete(&quote.author.url)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _) = send(&app, get(&quote.url)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, delete(&quote.author.url)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_author_pagination() {
    let app = make_app();
    for name in ["A", "B", "C", "D"] {
        create_author(&app, name).await;
    }

    let (status, page): (_, ListResponse<MiniAuthor>) =
        send_json(&app, get("/authors?limit=2&offset=0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 4);
    assert_eq!(page.next_page.as_deref(), Some("/authors?limit=2&offset=2"));

    let (_, last): (_, ListResponse<MiniAuthor>) =
        send_json(&app, get(page.next_page.as_deref().unwrap())).await;
    assert_eq!(last.items[1].name, "D");
    assert_eq!(last.next_page, None);

    let (status, err): (_, ErrorBody) = send_json(&app, get("/authors?limit=2&offset=4")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err.error_name, "PageNotFound");
}

#[tokio::test]
async fn test_limit_is_capped() {
    let app = make_app();
    create_author(&app, "A").await;
    let (status, page): (_, ListResponse<MiniAuthor>) =
        send_json(&app, get("/authors?limit=500")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page.limit, 50);

    let (_, page): (_, ListResponse<MiniAuthor>) = send_json(&app, get("/authors?limit=0")).await;
    assert_eq!(page.limit, 1);
}

#[tokio::test]
async fn test_empty_collection_first_page() {
    let app = make_app();
    let (status, page): (_, ListResponse<MiniQuote>) = send_json(&app, get("/quotes")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);

    let (status, _) = send(&app, get("/quotes?offset=1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_pagination_params() {
    let app = make_app();
    let (status, err): (_, ErrorBody) = send_json(&app, get("/quotes?offset=-3")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error_name, "InvalidParameterError");
}

#[tokio::test]
async fn test_repeated_query_key_is_json_error() {
    let app = make_app();
    for uri in ["/authors?limit=1&limit=2", "/quotes?offset=0&offset=5"] {
        let (status, err): (_, ErrorBody) = send_json(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert_eq!(err.error_name, "InvalidParameterError");
        assert_eq!(err.response_code, 400);
    }
}

#[tokio::test]
async fn test_malformed_path_id_is_json_error() {
    let app = make_app();
    for uri in [
        "/authors/abc",
        "/authors/1.5/quotes",
        "/quotes/99999999999999999999",
    ] {
        let (status, err): (_, ErrorBody) = send_json(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert_eq!(err.error_name, "InvalidParameterError");
    }

    let (status, err): (_, ErrorBody) =
        send_json(&app, with_json("PATCH", "/quotes/abc", json!({"content": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error_name, "InvalidParameterError");

    let (status, err): (_, ErrorBody) = send_json(&app, delete("/authors/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error_name, "InvalidParameterError");
}

// =============================================================================
// Quotes
// =============================================================================

#[tokio::test]
async fn test_create_quote_creates_author() {
    let app = make_app();
    let quote = create_quote(&app, "The unexamined life is not worth living.", "Socrates").await;
    assert_eq!(quote.author.name, "Socrates");
    assert_eq!(quote.url, format!("/quotes/{}", quote.id));

    let (status, author): (_, AuthorResponse) = send_json(&app, get(&quote.author.url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(author.name, "Socrates");

    let (status, fetched): (_, QuoteResponse) = send_json(&app, get(&quote.url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, quote);
}

#[tokio::test]
async fn test_duplicate_quote_per_author() {
    let app = make_app();
    create_quote(&app, "Veni, vidi, vici.", "Caesar").await;

    let (status, err): (_, ErrorBody) = send_json(
        &app,
        with_json(
            "POST",
            "/quotes",
            json!({"content": "Veni, vidi, vici.", "author": {"name": "Caesar"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error_name, "QuoteAlreadyExistsError");

    create_quote(&app, "Veni, vidi, vici.", "A Parrot").await;
}

#[tokio::test]
async fn test_create_quote_requires_author() {
    let app = make_app();
    let (status, err): (_, ErrorBody) =
        send_json(&app, with_json("POST", "/quotes", json!({"content": "orphan"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(err.details.unwrap().get("author").is_some());

    let (status, err): (_, ErrorBody) = send_json(
        &app,
        with_json("POST", "/quotes", json!({"content": "orphan", "author": {"id": 1}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(err.details.unwrap().get("author.name").is_some());
}

#[tokio::test]
async fn test_author_quotes_endpoint() {
    let app = make_app();
    let author = create_author(&app, "Basho").await;

    let (status, quote): (_, QuoteResponse) = send_json(
        &app,
        with_json(
            "POST",
            &author.quotes,
            json!({"content": "An old silent pond.", "context": "Haiku"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(quote.author.id, author.id);
    assert_eq!(quote.context.as_deref(), Some("Haiku"));

    let (status, list): (_, ListResponse<MiniQuote>) = send_json(&app, get(&author.quotes)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.total, 1);

    let (status, _) = send(&app, get("/authors/999/quotes")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_quote() {
    let app = make_app();
    let quote = create_quote(&app, "Less is more.", "Browning").await;

    let (status, replaced): (_, QuoteResponse) = send_json(
        &app,
        with_json(
            "PUT",
            &quote.url,
            json!({"content": "Less is more!", "author": {"name": "Browning"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced.content, "Less is more!");
    assert!(replaced.updated_at.is_some());

    let (status, patched): (_, QuoteResponse) = send_json(
        &app,
        with_json("PATCH", &quote.url, json!({"context": "Andrea del Sarto"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched.content, "Less is more!");
    assert_eq!(patched.context.as_deref(), Some("Andrea del Sarto"));
}

#[tokio::test]
async fn test_update_quote_author_forbidden() {
    let app = make_app();
    let quote = create_quote(&app, "Less is more.", "Browning").await;
    let (status, err): (_, ErrorBody) = send_json(
        &app,
        with_json("PATCH", &quote.url, json!({"author": {"name": "Mies van der Rohe"}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error_name, "CanNotCreateOrEditAuthorsFromQuoteUpdate");

    let (_, unchanged): (_, QuoteResponse) = send_json(&app, get(&quote.url)).await;
    assert_eq!(unchanged.author, quote.author);
}

#[tokio::test]
async fn test_delete_quote() {
    let app = make_app();
    let quote = create_quote(&app, "Less is more.", "Browning").await;
    let (status, _) = send(&app, delete(&quote.url)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, get(&quote.url)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, get(&quote.author.url)).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Request bodies
// =============================================================================

#[tokio::test]
async fn test_no_data_bodies() {
    let app = make_app();
    for body in ["", "{}", "[]", "null"] {
        let (status, err): (_, ErrorBody) =
            send_json(&app, with_body("POST", "/authors", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(err.error_name, "NoDataError");
    }
}

#[tokio::test]
async fn test_malformed_json() {
    let app = make_app();
    let (status, err): (_, ErrorBody) =
        send_json(&app, with_body("POST", "/quotes", "{\"content\": ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error_name, "MalformedJsonError");
}

#[tokio::test]
async fn test_non_object_body() {
    let app = make_app();
    let (status, err): (_, ErrorBody) =
        send_json(&app, with_body("POST", "/authors", "\"Homer\"")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(err.details.unwrap().get("_schema").is_some());
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let app = make_app();
    let big = json!({ "name": "x".repeat(2 * 1024 * 1024) });
    let (status, _) = send(&app, with_json("POST", "/authors", big)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}
