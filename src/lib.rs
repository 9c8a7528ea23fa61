//! CORS relay: forwards a request to the URL named in its `url` query
//! parameter and returns the upstream response with permissive
//! cross-origin headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::schema::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
