//! HTTP client for the scoring backend

use crate::config::Config;
use bytes::Bytes;
use http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode};
use reqwest::{redirect, Client};
use serde_json::Value;
use std::sync::Arc;

/// Content type assumed when the backend sends none
const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Client for `POST <base>/pick_best_question`
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    url: Arc<str>,
}

/// Backend reply, kept as raw bytes
#[derive(Debug)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            url: config.upstream_url().into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one request with `payload` as the JSON body.
    ///
    /// Any HTTP status is a successful exchange, redirects included. Errors
    /// only cover transport failures, including failing to read the body.
    pub async fn pick_best_question(
        &self,
        payload: &Value,
    ) -> Result<BackendResponse, reqwest::Error> {
        let response = self.client.post(self.url()).json(payload).send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(BackendResponse {
            status,
            headers,
            body,
        })
    }
}

impl BackendResponse {
    /// Content type to mirror back to the caller
    pub fn content_type(&self) -> HeaderValue {
        self.headers
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE))
    }

    /// First `max_chars` characters of the body, for logs
    pub fn body_preview(&self, max_chars: usize) -> String {
        String::from_utf8_lossy(&self.body)
            .chars()
            .take(max_chars)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn response(headers: HeaderMap, body: &'static str) -> BackendResponse {
        BackendResponse {
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[test]
    fn test_content_type_defaults_to_json() {
        let resp = response(HeaderMap::new(), "{}");
        assert_eq!(resp.content_type(), "application/json");

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let resp = response(headers, "hi");
        assert_eq!(resp.content_type(), "text/plain");
    }

    #[test]
    fn test_body_preview_is_char_safe() {
        let resp = response(HeaderMap::new(), "привет мир");
        assert_eq!(resp.body_preview(6), "привет");
        assert_eq!(resp.body_preview(500), "привет мир");
    }

    #[tokio::test]
    async fn test_posts_payload_to_fixed_path() {
        let server = MockServer::start().await;
        let payload = serde_json::json!({"start": "2024-01-01 00:00", "dedupe": true});

        Mock::given(method("POST"))
            .and(path("/pick_best_question"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(418).set_body_string("teapot"))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config::with_backend(format!("{}/", server.uri()));
        let client = BackendClient::new(&config).unwrap();
        let resp = client.pick_best_question(&payload).await.unwrap();

        assert_eq!(resp.status, StatusCode::IM_A_TEAPOT);
        assert_eq!(resp.body, Bytes::from_static(b"teapot"));
    }

    #[tokio::test]
    async fn test_does_not_follow_redirects() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/pick_best_question"))
            .respond_with(ResponseTemplate::new(303).insert_header("location", "/elsewhere"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/elsewhere"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = BackendClient::new(&Config::with_backend(server.uri())).unwrap();
        let resp = client.pick_best_question(&serde_json::json!({})).await.unwrap();

        assert_eq!(resp.status, StatusCode::SEE_OTHER);
        assert_eq!(resp.headers["location"], "/elsewhere");
    }
}
