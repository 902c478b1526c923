//! HTTP client for the qpick proxy

use anyhow::{Context, Result};
use qpick_common::{constants, PickRequest};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Longest error body echoed back to the user
const MAX_ERROR_CHARS: usize = 300;

pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .read_timeout(Duration::from_secs(180))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send a pick request and return the raw response body
    pub async fn pick_best_question(&self, request: &PickRequest) -> Result<String> {
        let url = format!("{}{}", self.base_url, constants::API_PATH);
        tracing::debug!("POST {} [{}]", url, request.mode());

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to reach proxy at {}", self.base_url))?;

        let status = response.status();
        let text = response.text().await.context("Failed to read proxy response")?;

        if !status.is_success() {
            anyhow::bail!("{}", error_message(status, &text));
        }

        Ok(text)
    }

    /// Fetch the proxy health document
    pub async fn health(&self) -> Result<Value> {
        let url = format!("{}{}", self.base_url, constants::HEALTH_PATH);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach proxy at {}", self.base_url))?;

        let status = response.status();
        let text = response.text().await.context("Failed to read proxy response")?;

        if !status.is_success() {
            anyhow::bail!("{}", error_message(status, &text));
        }

        serde_json::from_str(&text).context("Proxy returned invalid health JSON")
    }
}

/// `HTTP <code>: <detail>`, preferring the proxy's `{"error": ...}` text
fn error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_CHARS).collect());

    if detail.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpick_common::Mode;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> PickRequest {
        PickRequest::new("2024-01-01 00:00", "2024-01-01 06:00", "Europe/Amsterdam")
            .with_mode(Mode::OnlyList)
    }

    #[test]
    fn test_error_message_prefers_error_field() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, r#"{"error":"backend unreachable: refused"}"#),
            "HTTP 502: backend unreachable: refused"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, "nope"), "HTTP 404: nope");
        assert_eq!(error_message(StatusCode::INTERNAL_SERVER_ERROR, ""), "HTTP 500");
    }

    #[tokio::test]
    async fn test_pick_posts_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/pick_best_question"))
            .and(body_json(serde_json::to_value(request()).unwrap()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"candidates_count":0}"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ProxyClient::new(&format!("{}/", server.uri())).unwrap();
        let body = client.pick_best_question(&request()).await.unwrap();
        assert_eq!(body, r#"{"candidates_count":0}"#);
    }

    #[tokio::test]
    async fn test_pick_surfaces_proxy_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/pick_best_question"))
            .respond_with(ResponseTemplate::new(502).set_body_raw(
                r#"{"error":"backend unreachable: connection refused"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let client = ProxyClient::new(&server.uri()).unwrap();
        let err = client.pick_best_question(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 502: backend unreachable: connection refused");
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "service": "qpick-server",
                "version": "0.1.0",
                "backend_url": "http://127.0.0.1:8888"
            })))
            .mount(&server)
            .await;

        let client = ProxyClient::new(&server.uri()).unwrap();
        let health = client.health().await.unwrap();
        assert_eq!(health["service"], "qpick-server");
    }
}
