//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay pipeline produces:
//!     → logging.rs (structured log events, request ID on each)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
