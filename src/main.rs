//! CORS relay server.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                      CORS RELAY                      │
//!  Caller         │  ┌─────────┐    ┌──────────┐    ┌───────────┐        │
//!  ───────────────┼─▶│  http   │───▶│ ingress  │───▶│ forwarder │────────┼──▶ Target
//!   ?url=<target> │  │ server  │    │normalize │    │ (reqwest) │        │
//!                 │  └─────────┘    └──────────┘    └─────┬─────┘        │
//!                 │       ▲                               │              │
//!  ◀──────────────┼───────┴──────── egress (CORS set) ◀───┘              │
//!                 │                                                      │
//!                 │  config · observability · lifecycle                  │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_relay::config::validation::validate_config;
use cors_relay::config::{load_config, ConfigError, RelayConfig};
use cors_relay::lifecycle::signals::spawn_signal_handler;
use cors_relay::observability::{logging, metrics};
use cors_relay::{RelayServer, Shutdown};

#[derive(Parser)]
#[command(name = "cors-relay")]
#[command(about = "Relay HTTP requests to any URL with permissive CORS headers", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

/// Load the file (or defaults), apply CLI overrides, then validate the result.
fn resolve_config(cli: &Cli) -> Result<RelayConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability);

    tracing::info!("cors-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        path = %config.relay.path,
        body_mode = ?config.relay.body_mode,
        origin_policy = ?config.cors.origin_policy,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_handler(&shutdown);

    let server = RelayServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_override_is_validated() {
        let cli = Cli::parse_from(["cors-relay", "--bind", "not-an-address"]);
        match resolve_config(&cli) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors[0].field, "listener.bind_address");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn bind_override_replaces_default() {
        let cli = Cli::parse_from(["cors-relay", "--bind", "127.0.0.1:3000"]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
    }
}
