//! Unified gateway binary.
//!
//! Serves a static site with single-page fallback, a couple of
//! demonstration JSON endpoints and an `echo` socket channel.
//!
//! ```text
//! GET  /api/echo?...   → {"time", "uri", "path", "parameters"}
//! GET  /api/delay?...  → same, answered after a delay
//! WS   /socket         → {"channel":"echo","payload":{"id":1,...}} is sent back
//! *                    → files under assets.root, else assets.index_path, else 404
//! ```

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;

use unified_gateway::config::{load_config, validate_config, ConfigError, GatewayConfig};
use unified_gateway::lifecycle::{shutdown_signal, Shutdown};
use unified_gateway::observability::{logging, metrics};
use unified_gateway::{ConnectionHandle, Gateway, JsonObject, RequestQuery, Responder};

#[derive(Parser)]
#[command(name = "unified-gateway")]
#[command(about = "Static assets, JSON endpoints and WebSockets on one port", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override assets.root.
    #[arg(short, long)]
    root: Option<String>,

    /// Delay for /api/delay, in seconds.
    #[arg(long, default_value_t = 5)]
    delay_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(root) = cli.root {
        config.assets.root = Some(root);
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability);
    tracing::info!("unified-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        asset_root = ?config.assets.root,
        socket_path = %config.socket.path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<std::net::SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let mut gateway = Gateway::new(config);
    let delay = Duration::from_secs(cli.delay_secs);
    gateway
        .register("/api/echo*", |query: RequestQuery, _body: JsonObject, responder: Responder| {
            responder.ok(echo(&query));
        })
        .register("/api/delay*", move |query: RequestQuery, _body: JsonObject, responder: Responder| {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                responder.ok(echo(&query));
            });
        })
        .register_channel("echo", |connection: ConnectionHandle, identity: i64, payload: JsonObject| {
            tracing::debug!(identity, "Echoing socket event");
            connection.send("echo", Some(&payload));
        });

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    gateway.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn echo(query: &RequestQuery) -> serde_json::Value {
    let time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    json!({
        "time": time,
        "uri": query.uri,
        "path": query.path,
        "parameters": query.parameters_json(),
    })
}
