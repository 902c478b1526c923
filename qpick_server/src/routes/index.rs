//! Serves the single-page UI

use crate::{html::INDEX_HTML, routes::AppState};
use axum::{response::Html, routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(serve_page))
}

async fn serve_page() -> Html<&'static str> {
    tracing::debug!("Serving index page");
    Html(INDEX_HTML)
}
