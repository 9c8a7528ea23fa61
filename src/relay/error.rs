//! Relay error taxonomy and its JSON rendering.

use std::error::Error as _;

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Failures raised by the relay pipeline.
///
/// Upstream 4xx/5xx responses are not errors here; they are relayed verbatim.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The `url` query parameter is absent or empty.
    #[error("URL parameter is required")]
    MissingTarget,

    /// The `url` query parameter is not an absolute http(s) URL.
    #[error("Invalid target URL: {0}")]
    InvalidTarget(String),

    /// A JSON body failed to decode.
    #[error("Invalid JSON body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// The inbound body exceeded the configured limit.
    #[error("Request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The inbound body stream broke before completion.
    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    /// The method is not served by the relay.
    #[error("Method {0} not allowed")]
    MethodNotAllowed(axum::http::Method),

    /// DNS, connect, TLS or protocol failure reaching the target.
    #[error("Failed to proxy request: {0}")]
    Transport(String),

    /// The target did not answer within the configured bound.
    #[error("Upstream did not respond within {0} seconds")]
    UpstreamTimeout(u64),
}

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RelayError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingTarget
            | RelayError::InvalidTarget(_)
            | RelayError::InvalidBody(_)
            | RelayError::BodyRead(_) => StatusCode::BAD_REQUEST,
            RelayError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Transport(_) => StatusCode::BAD_GATEWAY,
            RelayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Human-readable category used as the `error` field.
    pub fn category(&self) -> &'static str {
        match self {
            RelayError::MissingTarget => "URL parameter is required",
            RelayError::InvalidTarget(_) => "Invalid target URL",
            RelayError::InvalidBody(_) => "Invalid JSON body",
            RelayError::BodyTooLarge { .. } => "Request body too large",
            RelayError::BodyRead(_) => "Failed to read request body",
            RelayError::MethodNotAllowed(_) => "Method not allowed",
            RelayError::Transport(_) => "Failed to proxy request",
            RelayError::UpstreamTimeout(_) => "Upstream request timed out",
        }
    }

    /// True when the failure came from reaching the target, not from the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(self, RelayError::Transport(_) | RelayError::UpstreamTimeout(_))
    }

    /// Structured body; `message` carries the detail when there is one.
    pub fn body(&self) -> ErrorBody {
        let message = match self {
            RelayError::MissingTarget | RelayError::MethodNotAllowed(_) => None,
            RelayError::InvalidTarget(detail)
            | RelayError::BodyRead(detail)
            | RelayError::Transport(detail) => Some(detail.clone()),
            RelayError::InvalidBody(e) => Some(e.to_string()),
            RelayError::BodyTooLarge { .. } | RelayError::UpstreamTimeout(_) => Some(self.to_string()),
        };
        ErrorBody {
            error: self.category(),
            message,
        }
    }
}

/// Render a reqwest error with its source chain, which carries the DNS/connect detail.
pub fn describe_transport_error(err: &reqwest::Error) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        detail.push_str(": ");
        detail.push_str(&inner.to_string());
        source = inner.source();
    }
    detail
}
