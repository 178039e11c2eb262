//! vrworld-server: location metadata HTTP server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vrworld_core::MetadataResolver;
use vrworld_server::StartupError;
use vrworld_server::chain::EthClient;
use vrworld_server::config::Config;
use vrworld_server::vr::HeadlessRuntime;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Startup failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    // Load configuration
    let config = Config::from_env()?;

    let client = Arc::new(EthClient::new(
        &config.node_url,
        config.contract_address,
        config.chain_call_timeout,
    )?);

    tracing::info!(
        contract = %format!("0x{}", hex::encode(config.contract_address)),
        timeout_ms = config.chain_call_timeout.as_millis() as u64,
        strict_startup = config.strict_startup,
        "Using location contract"
    );

    vrworld_server::start_collaborators(
        &config,
        client.clone(),
        HeadlessRuntime::new(config.vr_app_name.clone()),
    )
    .await?;

    // Build application
    let resolver = MetadataResolver::new(client, config.chain_call_timeout);
    let app = vrworld_server::build_app(resolver, &config);

    // Start server
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|e: std::net::AddrParseError| StartupError::BindAddress {
            address: config.bind_address.clone(),
            reason: e.to_string(),
        })?;
    tracing::info!("Starting location server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
