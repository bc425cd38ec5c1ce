//! API proxy binary.
//!
//! Loads configuration, initialises the attestation verifier, and serves
//! until SIGINT/SIGTERM.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_proxy::lifecycle::signals;
use api_proxy::{attest, config, HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "api-proxy", about = "Authenticated key-injecting API proxy")]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the bind address (e.g. 127.0.0.1:8080).
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("api-proxy v0.1.0 starting");

    let cli = Cli::parse();
    let mut config = config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        app_check_enabled = config.app_check.enabled,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "configuration loaded"
    );

    let verifier = attest::build_verifier(&config.app_check).await;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, verifier)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
