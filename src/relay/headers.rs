//! Header projection between the caller and the target.
//!
//! # Responsibilities
//! - Strip `Host`, `Content-Length` and hop-by-hop headers from inbound requests
//! - Strip infrastructure and fetch-metadata headers by prefix
//! - Strip hop-by-hop headers from upstream responses
//!
//! # Design Decisions
//! - Exclusion list, not allow list: unknown headers (including
//!   `Authorization` and `Content-Type`) always pass through
//! - Filtering builds a new map; the inbound map is never mutated
//! - Repeated headers keep every value

use axum::http::header::{self, HeaderMap, HeaderName};

use crate::config::HeaderFilterConfig;

/// Connection-scoped headers that never cross the relay (RFC 7230 §6.1).
pub const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Inbound header exclusion policy.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    strip_prefixes: Vec<String>,
    strip_names: Vec<String>,
}

impl HeaderPolicy {
    /// Build the policy from configuration.
    pub fn from_config(config: &HeaderFilterConfig) -> Self {
        Self {
            strip_prefixes: config.strip_prefixes.clone(),
            strip_names: config.strip_names.clone(),
        }
    }

    /// Project the inbound header set onto the set forwarded to the target.
    pub fn filter(&self, inbound: &HeaderMap) -> HeaderMap {
        let nominated = connection_tokens(inbound);
        let mut outbound = HeaderMap::with_capacity(inbound.len());

        for (name, value) in inbound {
            if self.is_stripped(name, &nominated) {
                continue;
            }
            outbound.append(name.clone(), value.clone());
        }

        outbound
    }

    fn is_stripped(&self, name: &HeaderName, nominated: &[String]) -> bool {
        // HeaderName is always lowercase
        let name = name.as_str();

        name == header::HOST.as_str()
            || name == header::CONTENT_LENGTH.as_str()
            || HOP_BY_HOP.contains(&name)
            || nominated.iter().any(|token| token == name)
            || self.strip_names.iter().any(|n| n == name)
            || self.strip_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

/// Copy upstream response headers, dropping the hop-by-hop ones.
pub fn response_headers(upstream: &HeaderMap) -> HeaderMap {
    let nominated = connection_tokens(upstream);
    let mut headers = HeaderMap::with_capacity(upstream.len());

    for (name, value) in upstream {
        let n = name.as_str();
        if HOP_BY_HOP.contains(&n) || nominated.iter().any(|token| token == n) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers
}

/// Header names listed in `Connection`, which are hop-by-hop for this message.
fn connection_tokens(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}
