//! Outbound call to the target.
//!
//! # Responsibilities
//! - Send the normalized request with a shared HTTP client
//! - Follow redirects so the caller sees the final resource
//! - Convert every transport failure into a [`RelayError`]
//!
//! # Design Decisions
//! - Single attempt; retry policy belongs to the caller
//! - The timeout bounds the wait for the response head only, so
//!   event streams and large downloads are not cut off
//! - No automatic decompression: encoded bodies stream through untouched

use std::time::Duration;

use crate::config::TimeoutConfig;
use crate::relay::error::{describe_transport_error, RelayError};
use crate::relay::ingress::OutboundRequest;

/// Maximum redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// Sends [`OutboundRequest`]s. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    upstream_timeout: Duration,
}

impl Forwarder {
    /// Build the shared client.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            upstream_timeout: Duration::from_secs(timeouts.upstream_secs),
        })
    }

    /// Issue the request and wait for the upstream response head.
    pub async fn forward(&self, outbound: OutboundRequest) -> Result<reqwest::Response, RelayError> {
        let mut builder = self
            .client
            .request(outbound.method, outbound.target)
            .headers(outbound.headers);
        if let Some(body) = outbound.body {
            builder = builder.body(body);
        }

        match tokio::time::timeout(self.upstream_timeout, builder.send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(RelayError::Transport(describe_transport_error(&e))),
            Err(_) => Err(RelayError::UpstreamTimeout(self.upstream_timeout.as_secs())),
        }
    }
}
