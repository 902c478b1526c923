//! Proxy error taxonomy and its JSON rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::error::Error as _;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Client body could not be parsed, no backend call was made
    #[error("invalid JSON")]
    InvalidJson,

    /// Backend could not be reached or its response could not be read
    #[error("backend unreachable: {}", describe_transport(.0))]
    Unreachable(#[from] reqwest::Error),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidJson => StatusCode::BAD_REQUEST,
            ProxyError::Unreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure kind followed by the whole cause chain
fn describe_transport(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "transport error"
    };

    let mut message = format!("{}: {}", kind, err);
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ProxyError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::Unexpected("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ProxyError::InvalidJson.to_string(), "invalid JSON");
        assert_eq!(
            ProxyError::Unexpected("boom".to_string()).to_string(),
            "unexpected error: boom"
        );
    }
}
