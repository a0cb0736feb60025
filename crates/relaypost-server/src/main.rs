use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use relaypost_server::app;
use relaypost_server::config::ServerConfig;
use relaypost_server::state::build_state;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  relaypost-server [config.toml]    Start the server");
}

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install default CryptoProvider: {e:?}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("relaypost=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if matches!(args.get(1).map(|s| s.as_str()), Some("--help" | "-h")) {
        print_usage();
        return Ok(());
    }

    let config_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("config/server.toml");
    let config = match ServerConfig::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(
                path = %config_path,
                error = %e,
                "Config file not loaded, using defaults"
            );
            ServerConfig::default()
        }
    };

    relaypost_common::id::install(config.machine_id, config.node_id);

    tracing::info!(
        http_port = config.http_port,
        seeded_channels = config.credentials.len(),
        seeded_recipients = config.recipients.len(),
        "relaypost-server starting"
    );

    let state = build_state(config.clone());
    let app = app::build_http_app(state);

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    tracing::info!(http = %http_addr, "Server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
