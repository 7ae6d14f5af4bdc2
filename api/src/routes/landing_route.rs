//! GET / — static landing page.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Handler: GET /
pub async fn landing() -> Html<&'static str> {
    Html(INDEX_HTML)
}
