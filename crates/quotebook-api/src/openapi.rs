//! OpenAPI document served at `/spec`, and the HTML page at `/docs` that
//! renders it.
//!
//! The document is generated from the handler annotations and the response
//! types, so it cannot drift from what the routes actually return.

use axum::response::{Html, IntoResponse};
use axum::Json;
use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::handlers;
use crate::schemas::{AuthorResponse, ListResponse, MiniAuthor, MiniQuote, QuoteResponse};

/// Self-contained docs page; loads Swagger UI from a CDN and points it at
/// `/spec`.
pub const DOCS_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>quotebook API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = function () {
      window.ui = SwaggerUIBundle({ url: "/spec", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

#[derive(OpenApi)]
#[openapi(
    info(title = "quotebook", description = "Authors and their quotes."),
    paths(
        handlers::root,
        handlers::alive,
        handlers::healthy,
        handlers::list_authors,
        handlers::create_author,
        handlers::get_author,
        handlers::replace_author,
        handlers::patch_author,
        handlers::delete_author,
        handlers::list_author_quotes,
        handlers::create_author_quote,
        handlers::list_quotes,
        handlers::create_quote,
        handlers::get_quote,
        handlers::replace_quote,
        handlers::patch_quote,
        handlers::delete_quote
    ),
    components(schemas(
        AuthorResponse,
        MiniAuthor,
        QuoteResponse,
        MiniQuote,
        ListResponse<MiniAuthor>,
        ListResponse<MiniQuote>,
        ErrorBody
    )),
    tags(
        (name = "authors", description = "Authors and the quotes filed under them"),
        (name = "quotes", description = "Quotes"),
        (name = "service", description = "Layout and health checks")
    )
)]
pub struct ApiDoc;

/// GET /docs
pub async fn docs() -> impl IntoResponse {
    Html(DOCS_HTML)
}

/// GET /spec
pub async fn spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
