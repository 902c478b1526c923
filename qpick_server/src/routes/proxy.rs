//! Same-origin proxy to the scoring backend
//!
//! The body is relayed as parsed JSON and the backend reply is returned
//! untouched: status, raw body and content type.

use crate::{error::ProxyError, routes::AppState};
use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, Request, Response},
    routing::post,
    Router,
};
use qpick_common::{constants, Mode, SelectionFlags};
use serde_json::Value;

/// Largest client body accepted
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Characters of the backend body written to debug logs
const LOG_BODY_CHARS: usize = 500;

pub fn router() -> Router<AppState> {
    Router::new().route(constants::API_PATH, post(handle_pick_best_question))
}

/// Relay a pick request to the backend
async fn handle_pick_best_question(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let body = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read request body: {}", e);
            ProxyError::InvalidJson
        })?;

    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!("Failed to parse JSON body: {}", e);
        ProxyError::InvalidJson
    })?;

    let mode = Mode::from_flags(SelectionFlags::from_payload(&payload));
    tracing::info!("Forwarding to backend [{}] -> {}", mode, state.backend.url());

    let upstream = state
        .backend
        .pick_best_question(&payload)
        .await
        .map_err(|e| {
            if e.is_builder() {
                tracing::error!("Invalid backend request [{}]: {}", mode, e);
                return ProxyError::Unexpected(e.to_string());
            }
            let err = ProxyError::Unreachable(e);
            tracing::error!("{} [{}]", err, mode);
            err
        })?;

    tracing::info!("Backend status: {} [{}]", upstream.status.as_u16(), mode);
    tracing::debug!("Backend headers: {:?}", upstream.headers);
    tracing::debug!(
        "Backend body (truncated): {}",
        upstream.body_preview(LOG_BODY_CHARS)
    );

    let content_type = upstream.content_type();
    Response::builder()
        .status(upstream.status)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(upstream.body))
        .map_err(|e| {
            tracing::error!("Unexpected error during proxy call: {}", e);
            ProxyError::Unexpected(e.to_string())
        })
}

#[cfg(test)]
mod tests {
    use crate::{config::Config, routes};
    use axum::{
        body::{Body, Bytes},
        http::{header::CONTENT_TYPE, HeaderMap, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use std::time::Duration;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_for(backend_url: &str) -> Router {
        app_with(Config::with_backend(backend_url))
    }

    fn app_with(config: Config) -> Router {
        routes::app(routes::AppState::new(config).unwrap())
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, HeaderMap, Bytes) {
        let request = Request::post("/api/pick_best_question")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body)
    }

    fn error_message(body: &Bytes) -> String {
        let json: Value = serde_json::from_slice(body).unwrap();
        json["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_invalid_json_is_rejected_without_backend_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for body in ["", "{not json", "{\"start\": \"2024-01-01 00:00\",}", "[1, 2"] {
            let (status, _, resp_body) = post_json(app_for(&server.uri()), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
            assert_eq!(error_message(&resp_body), "invalid JSON");
        }
    }

    #[tokio::test]
    async fn test_forwards_reserialized_body_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pick_best_question"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"candidates_count": 0})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client_body = r#"{
            "start": "2024-01-01 00:00",
            "end": "2024-01-01 06:00",
            "tz": "Europe/Amsterdam",
            "candidate_limit": 50,
            "use_prescoring": true,
            "dedupe": false,
            "scoring_criteria": "clarity",
            "do_final_llm_selection": true,
            "return_candidates_only": false,
            "zz_backend_extension": {"b": 2, "a": 1}
        }"#;

        let (status, _, _) = post_json(app_for(&server.uri()), client_body).await;
        assert_eq!(status, StatusCode::OK);

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);

        let parsed: Value = serde_json::from_str(client_body).unwrap();
        assert_eq!(received[0].body, serde_json::to_vec(&parsed).unwrap());

        // Key order survives the round trip
        let forwarded = String::from_utf8(received[0].body.clone()).unwrap();
        assert!(forwarded.starts_with(r#"{"start":"2024-01-01 00:00","end":"2024-01-01 06:00""#));
        assert!(forwarded.ends_with(r#""zz_backend_extension":{"b":2,"a":1}}"#));
    }

    #[tokio::test]
    async fn test_mirrors_backend_status_and_body() {
        for (code, body, content_type) in [
            (200u16, r#"{"ok":true}"#, "application/json"),
            (404, "no such route", "text/plain"),
            (500, r#"{"detail":"scoring failed"}"#, "application/json"),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/pick_best_question"))
                .respond_with(ResponseTemplate::new(code).set_body_raw(body, content_type))
                .mount(&server)
                .await;

            let (status, headers, resp_body) = post_json(app_for(&server.uri()), "{}").await;

            assert_eq!(status.as_u16(), code);
            assert_eq!(resp_body, Bytes::from(body));
            assert_eq!(headers[CONTENT_TYPE], content_type);
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_bad_gateway() {
        // Reserve a port, then free it so nothing is listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let app = app_for(&format!("http://{}", addr));
        let (status, headers, body) = post_json(app, r#"{"return_candidates_only":true}"#).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        let message = error_message(&body);
        assert!(
            message.starts_with("backend unreachable: connection failed: "),
            "{}",
            message
        );
        assert!(message.contains(&addr.to_string()), "{}", message);
    }

    #[tokio::test]
    async fn test_backend_timeout_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pick_best_question"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = Config::with_backend(server.uri());
        config.read_timeout = Duration::from_millis(300);

        let (status, _, body) = post_json(app_with(config), "{}").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let message = error_message(&body);
        assert!(
            message.starts_with("backend unreachable: timed out: "),
            "{}",
            message
        );
    }

    #[tokio::test]
    async fn test_redirect_status_is_mirrored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pick_best_question"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", "/elsewhere")
                    .set_body_raw("moved", "text/plain"),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/elsewhere"))
            .respond_with(ResponseTemplate::new(200).set_body_string("followed"))
            .expect(0)
            .mount(&server)
            .await;

        let (status, _, body) = post_json(app_for(&server.uri()), "{}").await;

        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(body, Bytes::from("moved"));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_backend_url_is_internal_error() {
        let (status, _, body) = post_json(app_for("backend-without-scheme"), "{}").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error_message(&body).starts_with("unexpected error: "));
    }

    #[tokio::test]
    async fn test_candidates_only_passthrough() {
        let backend_body = concat!(
            r#"{"candidates_count":2,"candidates":["#,
            r#"{"rank":1,"msg_id":"a","chat_id":"c1","#,
            r#""created_at_iso":"2024-01-01T01:00:00Z","content":"Q1"},"#,
            r#"{"rank":2,"msg_id":"b","chat_id":"c1","#,
            r#""created_at_iso":"2024-01-01T02:00:00Z","content":"Q2"}]}"#
        );

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pick_best_question"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(backend_body, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let request = json!({
            "start": "2024-01-01 00:00",
            "end": "2024-01-01 06:00",
            "tz": "Europe/Amsterdam",
            "candidate_limit": 200,
            "return_candidates_only": true
        });

        let (status, _, body) = post_json(app_for(&server.uri()), &request.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Bytes::from(backend_body));

        let received = server.received_requests().await.unwrap();
        let forwarded: Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(forwarded, request);
    }

    #[tokio::test]
    async fn test_non_object_body_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pick_best_question"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_raw(r#"{"detail":"expected object"}"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (status, _, _) = post_json(app_for(&server.uri()), "[1,2,3]").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
