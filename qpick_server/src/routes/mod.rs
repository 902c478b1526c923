//! Route handlers for the qpick server

pub mod index;
pub mod proxy;

use crate::{backend::BackendClient, config::Config};
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use qpick_common::constants;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: BackendClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let backend = BackendClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            backend,
        })
    }
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(constants::HEALTH_PATH, get(health_check))
        .merge(index::router())
        .merge(proxy::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint, does not call the backend
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "service": constants::SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "backend_url": state.config.backend_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_backend() {
        let state = AppState::new(Config::with_backend("http://backend.internal:8888")).unwrap();

        let response = app(state)
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["service"], "qpick-server");
        assert_eq!(json["backend_url"], "http://backend.internal:8888");
    }
}
