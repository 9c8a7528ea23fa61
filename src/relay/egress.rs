//! Egress wrapping: upstream response → caller response.
//!
//! # Responsibilities
//! - Copy upstream status (code and reason phrase), headers and body
//! - Overwrite the cross-origin access header set on every response
//! - Answer preflight requests without touching any target
//! - Render relay errors as structured JSON
//!
//! # Design Decisions
//! - Upstream bodies are streamed, never buffered
//! - One origin policy per process, applied to every response kind
//! - `Cache-Control: no-store` replaces any upstream value when enabled

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use hyper::ext::ReasonPhrase;

use crate::config::{OriginPolicy, RelayConfig};
use crate::relay::error::RelayError;
use crate::relay::headers::response_headers;

pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";
pub const MAX_AGE: &str = "86400";
pub const NO_STORE: &str = "no-store";

/// Builds every response the relay sends.
#[derive(Debug, Clone)]
pub struct Egress {
    origin_policy: OriginPolicy,
    no_store: bool,
}

impl Egress {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            origin_policy: config.cors.origin_policy,
            no_store: config.relay.no_store,
        }
    }

    /// Wrap an upstream response, streaming its body through.
    pub fn relay(&self, upstream: reqwest::Response, origin: Option<&HeaderValue>) -> Response {
        let status = upstream.status();
        let headers = response_headers(upstream.headers());
        // present only when the upstream phrase differs from the canonical one
        let reason = upstream.extensions().get::<ReasonPhrase>().cloned();

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        if let Some(reason) = reason {
            response.extensions_mut().insert(reason);
        }
        *response.headers_mut() = self.decorate(headers, origin);
        response
    }

    /// `204 No Content` answer to a CORS preflight.
    pub fn preflight(&self, origin: Option<&HeaderValue>) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        *response.headers_mut() = self.decorate(HeaderMap::new(), origin);
        response
    }

    /// Structured JSON error response.
    pub fn error(&self, err: &RelayError, origin: Option<&HeaderValue>) -> Response {
        let mut response = (err.status(), Json(err.body())).into_response();

        let mut headers = std::mem::take(response.headers_mut());
        if let RelayError::MethodNotAllowed(_) = err {
            headers.insert(header::ALLOW, HeaderValue::from_static(ALLOW_METHODS));
        }
        *response.headers_mut() = self.decorate(headers, origin);
        response
    }

    /// Add the cross-origin access set (and cache directive) to `headers`.
    pub fn decorate(&self, mut headers: HeaderMap, origin: Option<&HeaderValue>) -> HeaderMap {
        let allow_origin = match (self.origin_policy, origin) {
            (OriginPolicy::Echo, Some(origin)) => origin.clone(),
            _ => HeaderValue::from_static("*"),
        };
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE));

        if self.origin_policy == OriginPolicy::Echo && !varies_on_origin(&headers) {
            headers.append(header::VARY, HeaderValue::from_static("Origin"));
        }
        if self.no_store {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
        }

        headers
    }
}

/// Whether the methods the relay forwards include `method`.
pub fn is_relayed_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::POST | Method::PUT | Method::DELETE | Method::PATCH
    )
}

fn varies_on_origin(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|token| token == "*" || token.eq_ignore_ascii_case("origin"))
}
