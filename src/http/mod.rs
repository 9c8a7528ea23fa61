//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assigned or kept)
//!     → relay pipeline (crate::relay)
//!     → Send to caller (request ID echoed)
//! ```

pub mod request;
pub mod server;

pub use request::{MakeRelayRequestId, RequestIdExt, X_REQUEST_ID};
pub use server::RelayServer;
