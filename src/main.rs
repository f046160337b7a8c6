use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber;

use quotagate::config::GateConfig;
use quotagate::http::HttpServer;
use quotagate::metrics::DecisionMetrics;
use quotagate::ratelimit::DecisionEngine;
use quotagate::store::{CounterStore, RedisStore};

/// Distributed admission-control gate.
#[derive(Parser, Debug)]
#[command(name = "quotagate", version, about)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Address to listen on (overrides the configuration file)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let cli = Cli::parse();

    info!("Starting Quotagate Admission Gate");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match cli.config {
        Some(path) => GateConfig::from_file(&path)?,
        None => GateConfig::default(),
    };
    if let Some(listen_addr) = cli.listen {
        config.server.listen_addr = listen_addr;
    }
    info!(
        listen_addr = %config.server.listen_addr,
        redis_url = %config.redis.url,
        "Configuration loaded"
    );

    // Connect to the counting store with bounded timeouts
    let client = redis::Client::open(config.redis.url.as_str())?;
    let manager_config = ConnectionManagerConfig::new()
        .set_connection_timeout(config.redis.connect_timeout())
        .set_response_timeout(config.redis.response_timeout());
    let connection = ConnectionManager::new_with_config(client, manager_config).await?;
    let store: Arc<dyn CounterStore> = Arc::new(RedisStore::new(connection));
    info!("Counting store connected");

    // Initialize the decision engine
    let metrics = DecisionMetrics::new()?;
    let engine = Arc::new(DecisionEngine::new(store, metrics));
    info!("Decision engine initialized");

    // Run the server with graceful shutdown on Ctrl+C
    let server = HttpServer::new(config.server.listen_addr, engine);
    server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Quotagate Admission Gate stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
