//! Ingress normalization: inbound request → forwardable request.
//!
//! # Responsibilities
//! - Extract and validate the target URL from the `url` query parameter
//! - Filter inbound headers (see `headers.rs`)
//! - Materialize the body for methods that carry one
//!
//! # Design Decisions
//! - `GET`/`HEAD` bodies are never read, never forwarded
//! - Bodies are read fully (bounded) before forwarding
//! - In `json` mode, JSON bodies are decoded and re-encoded; other content
//!   types and content-encoded bodies are forwarded byte-for-byte

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request};
use futures_util::StreamExt;
use url::Url;

use crate::config::{BodyMode, RelayConfig};
use crate::relay::error::RelayError;
use crate::relay::headers::HeaderPolicy;

/// Name of the query parameter carrying the target URL.
pub const TARGET_PARAM: &str = "url";

/// The request as it will be sent to the target.
#[derive(Debug)]
pub struct OutboundRequest {
    pub target: Url,
    pub method: Method,
    pub headers: HeaderMap,
    /// `None` for body-less methods.
    pub body: Option<Bytes>,
}

/// Turns inbound requests into [`OutboundRequest`]s.
#[derive(Debug, Clone)]
pub struct Ingress {
    headers: HeaderPolicy,
    body_mode: BodyMode,
    max_body_bytes: usize,
}

impl Ingress {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            headers: HeaderPolicy::from_config(&config.headers),
            body_mode: config.relay.body_mode,
            max_body_bytes: config.relay.max_body_bytes,
        }
    }

    /// Validate the target and build the forwardable request.
    ///
    /// The target is checked before the body is touched, so a missing URL
    /// never costs a body read.
    pub async fn normalize(&self, request: Request<Body>) -> Result<OutboundRequest, RelayError> {
        let (parts, body) = request.into_parts();

        let target = extract_target(parts.uri.query())?;
        let headers = self.headers.filter(&parts.headers);

        let body = if carries_body(&parts.method) {
            let raw = read_body(body, &parts.headers, self.max_body_bytes).await?;
            Some(normalize_body(self.body_mode, &parts.headers, raw)?)
        } else {
            None
        };

        Ok(OutboundRequest {
            target,
            method: parts.method,
            headers,
            body,
        })
    }
}

/// Pull the target URL out of a raw query string.
pub fn extract_target(query: Option<&str>) -> Result<Url, RelayError> {
    let raw = query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == TARGET_PARAM)
                .map(|(_, value)| value.into_owned())
        })
        .filter(|value| !value.trim().is_empty())
        .ok_or(RelayError::MissingTarget)?;

    let target = Url::parse(raw.trim()).map_err(|e| RelayError::InvalidTarget(e.to_string()))?;

    match target.scheme() {
        "http" | "https" => Ok(target),
        other => Err(RelayError::InvalidTarget(format!("unsupported scheme '{}'", other))),
    }
}

/// Whether a body is read and forwarded for this method.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Read the whole inbound body, refusing anything over `limit` bytes.
pub async fn read_body(body: Body, headers: &HeaderMap, limit: usize) -> Result<Bytes, RelayError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(RelayError::BodyTooLarge { limit });
    }

    let mut stream = body.into_data_stream();
    let mut buf = Vec::with_capacity(declared.unwrap_or(0));
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| RelayError::BodyRead(e.to_string()))?;
        if buf.len() + chunk.len() > limit {
            return Err(RelayError::BodyTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buf))
}

/// Apply the body mode to a fully read body.
pub fn normalize_body(mode: BodyMode, headers: &HeaderMap, raw: Bytes) -> Result<Bytes, RelayError> {
    match mode {
        BodyMode::Json if is_json(headers) && !is_encoded(headers) && !raw.is_empty() => {
            let value: serde_json::Value = serde_json::from_slice(&raw)?;
            Ok(Bytes::from(serde_json::to_vec(&value)?))
        }
        _ => Ok(raw),
    }
}

/// `application/json` or any `+json` structured syntax suffix.
fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json" || essence.ends_with("+json")
}

/// A `Content-Encoding` other than `identity`: the bytes are not the JSON text.
fn is_encoded(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::CONTENT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|coding| !coding.is_empty() && !coding.eq_ignore_ascii_case("identity"))
}
