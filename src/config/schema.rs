//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the CORS relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration for outbound calls.
    pub timeouts: TimeoutConfig,

    /// Relay endpoint behaviour.
    pub relay: RelaySettings,

    /// Inbound header filtering.
    pub headers: HeaderFilterConfig,

    /// Cross-origin response policy.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for the outbound call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Maximum wait for the upstream response head in seconds.
    /// The response body is not covered, so long-lived streams stay open.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            upstream_secs: 60,
        }
    }
}

/// How request bodies are reconstructed before forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyMode {
    /// JSON bodies are decoded and re-encoded; everything else is raw.
    #[default]
    Json,
    /// Bodies are forwarded as opaque bytes regardless of content type.
    Opaque,
}

/// Relay endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Path the relay endpoint is mounted at.
    pub path: String,

    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,

    /// Body reconstruction mode.
    pub body_mode: BodyMode,

    /// Mark every response as non-cacheable.
    pub no_store: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            path: "/api/proxy".to_string(),
            max_body_bytes: 10 * 1024 * 1024, // 10MB
            body_mode: BodyMode::Json,
            no_store: true,
        }
    }
}

/// Inbound header filtering configuration.
///
/// `host`, `content-length` and hop-by-hop headers are always stripped;
/// these settings extend that list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderFilterConfig {
    /// Header name prefixes to strip (lowercase).
    pub strip_prefixes: Vec<String>,

    /// Additional exact header names to strip (lowercase).
    pub strip_names: Vec<String>,
}

impl Default for HeaderFilterConfig {
    fn default() -> Self {
        Self {
            strip_prefixes: vec!["x-vercel-".to_string(), "sec-fetch-".to_string()],
            strip_names: Vec::new(),
        }
    }
}

/// Source of the `Access-Control-Allow-Origin` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OriginPolicy {
    /// Always `*`.
    #[default]
    Wildcard,
    /// Echo the caller's `Origin` header and add `Vary: Origin`.
    Echo,
}

/// Cross-origin response configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// Allow-Origin policy applied to every response.
    pub origin_policy: OriginPolicy,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
