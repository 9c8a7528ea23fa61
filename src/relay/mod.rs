//! The relay pipeline.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → OPTIONS? egress.rs preflight (no target contacted)
//!     → ingress.rs (target URL, header filter, body reconstruction)
//!     → forwarder.rs (single outbound call, redirects followed)
//!     → egress.rs (status/headers/body copied, CORS set overwritten)
//!     → Send to caller
//!
//! Any stage failing:
//!     → error.rs (RelayError → status + JSON body)
//!     → egress.rs (CORS set added to the error too)
//! ```
//!
//! # Design Decisions
//! - No state shared between requests beyond the outbound client pool
//! - Stages return `Result`; only [`Relay::handle`] turns errors into responses
//! - Upstream 4xx/5xx are relayed, not treated as failures

pub mod egress;
pub mod error;
pub mod forwarder;
pub mod headers;
pub mod ingress;

use std::time::Instant;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;

use crate::config::RelayConfig;
use crate::http::request::RequestIdExt;
use crate::observability::metrics;

pub use egress::Egress;
pub use error::RelayError;
pub use forwarder::Forwarder;
pub use headers::HeaderPolicy;
pub use ingress::{Ingress, OutboundRequest};

/// Ingress → Forwarder → Egress, for one request at a time.
#[derive(Debug, Clone)]
pub struct Relay {
    ingress: Ingress,
    forwarder: Forwarder,
    egress: Egress,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            ingress: Ingress::new(config),
            forwarder: Forwarder::new(&config.timeouts)?,
            egress: Egress::new(config),
        })
    }

    /// Produce the caller's response. Never fails; errors become JSON bodies.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let origin = request.headers().get(header::ORIGIN).cloned();
        let request_id = request.request_id().to_string();

        if method == Method::OPTIONS {
            tracing::debug!(request_id = %request_id, "Answering preflight");
            metrics::record_request(method.as_str(), 204, metrics::OUTCOME_PREFLIGHT, start);
            return self.egress.preflight(origin.as_ref());
        }

        match self.relay(request, &request_id).await {
            Ok(upstream) => {
                let status = upstream.status();
                tracing::debug!(
                    request_id = %request_id,
                    status = status.as_u16(),
                    final_url = %upstream.url(),
                    "Upstream responded"
                );
                metrics::record_request(method.as_str(), status.as_u16(), metrics::OUTCOME_RELAYED, start);
                self.egress.relay(upstream, origin.as_ref())
            }
            Err(err) => {
                if err.is_upstream() {
                    tracing::error!(request_id = %request_id, error = %err, "Upstream error");
                } else {
                    tracing::debug!(request_id = %request_id, error = %err, "Rejected request");
                }
                metrics::record_request(method.as_str(), err.status().as_u16(), metrics::OUTCOME_ERROR, start);
                self.egress.error(&err, origin.as_ref())
            }
        }
    }

    async fn relay(&self, request: Request<Body>, request_id: &str) -> Result<reqwest::Response, RelayError> {
        if !egress::is_relayed_method(request.method()) {
            return Err(RelayError::MethodNotAllowed(request.method().clone()));
        }

        let outbound = self.ingress.normalize(request).await?;

        tracing::debug!(
            request_id = %request_id,
            method = %outbound.method,
            target = %outbound.target,
            body_bytes = outbound.body.as_ref().map_or(0, |b| b.len()),
            "Forwarding request"
        );

        self.forwarder.forward(outbound).await
    }
}
