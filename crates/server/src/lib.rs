//! vrworld-server library crate
//!
//! Exposes `build_app`, `start_collaborators` and `config` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

pub mod chain;
pub mod config;
mod error;
mod middleware;
mod routes;
pub mod vr;

use axum::{Extension, Router, middleware as axum_mw, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vrworld_core::{ContractCaller, MetadataResolver};

use config::Config;
pub use error::StartupError;
pub use middleware::request_id::REQUEST_ID_HEADER;
use vr::VrRuntime;

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(resolver: MetadataResolver, config: &Config) -> Router {
    // Install Prometheus metrics recorder.
    // Use build_recorder() + set_global_recorder() so that repeated calls
    // (e.g. in integration tests) don't panic; the second install is
    // silently ignored and we still get a valid handle for /metrics.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    let public_routes = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    // Build CORS layer
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(public_routes)
        .merge(routes::world_routes())
        .with_state(resolver)
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}

/// Probe the provider and start the VR session.
///
/// With `strict_startup` both must succeed before the server binds. Otherwise
/// a failed probe is only logged and the VR session starts in the background.
pub async fn start_collaborators<R>(
    config: &Config,
    caller: Arc<dyn ContractCaller>,
    runtime: R,
) -> Result<(), StartupError>
where
    R: VrRuntime + 'static,
{
    match caller.is_connected().await {
        Ok(()) => tracing::info!(node = %config.node_url, "Connected to blockchain provider"),
        Err(e) if config.strict_startup => return Err(e.into()),
        Err(e) => tracing::warn!(
            node = %config.node_url,
            error = %e,
            "Blockchain provider unreachable at startup"
        ),
    }

    if !config.vr_enabled {
        tracing::info!("VR bootstrap disabled");
        return Ok(());
    }

    if config.strict_startup {
        vr::bootstrap(runtime).await?;
    } else {
        tokio::spawn(async move {
            if let Err(e) = vr::bootstrap(runtime).await {
                tracing::error!(error = %e, "VR bootstrap failed; HTTP service continues");
            }
        });
    }

    Ok(())
}
