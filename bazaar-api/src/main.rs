//! Bazaar API Server Entry Point
//!
//! Loads configuration, connects the remote data service client, starts the
//! presence prune job and serves the Axum router until ctrl-c.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use bazaar_api::constants::DEFAULT_REVALIDATE_CHANNEL_CAPACITY;
use bazaar_api::telemetry::{init_tracing, TelemetryConfig};
use bazaar_api::{
    build_revalidator, create_api_router, presence_prune_task, ApiConfig, ApiError, ApiResult,
    AppState, AuthConfig, BroadcastRevalidator, PresencePruneConfig,
};
use bazaar_storage::{RemoteConfig, RestClient};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> ApiResult<()> {
    // A missing .env file is normal outside local development.
    let _ = dotenvy::dotenv();

    init_tracing(&TelemetryConfig::from_env())?;

    let remote_config = RemoteConfig::from_env()?;
    let stores = Arc::new(RestClient::new(&remote_config)?);

    let api_config = ApiConfig::from_env();
    let auth_config = Arc::new(AuthConfig::from_env());

    let broadcast = Arc::new(BroadcastRevalidator::new(DEFAULT_REVALIDATE_CHANNEL_CAPACITY));
    let revalidator = Arc::new(build_revalidator(&api_config, broadcast)?);

    let state = AppState::new(stores, auth_config, &api_config, revalidator);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let prune_handle = tokio::spawn(presence_prune_task(
        state.presence.clone(),
        PresencePruneConfig::from_env(),
        shutdown_rx,
    ));

    let app: Router = create_api_router(state, &api_config)?;

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, remote = %remote_config.url, "Starting Bazaar API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    match prune_handle.await {
        Ok(metrics) => {
            let snapshot = metrics.snapshot();
            tracing::info!(
                entries_pruned = snapshot.entries_pruned,
                prune_cycles = snapshot.prune_cycles,
                "Presence prune job stopped"
            );
        }
        Err(e) => tracing::warn!(error = %e, "Presence prune job ended abnormally"),
    }

    Ok(())
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("BAZAAR_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("BAZAAR_API_PORT").ok())
        .unwrap_or_else(|| "3000".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
