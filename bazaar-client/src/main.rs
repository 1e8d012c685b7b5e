//! Bazaar client entry point.
//!
//! Mounts a session against the configured API, keeps the heartbeat running
//! until ctrl-c, then unmounts.

use bazaar_client::{
    ApiClient, BazaarClientConfig, ClientError, ClientSession, PresenceConfig, Visibility,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bazaar-client", about = "Keep a Bazaar session present")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = "BAZAAR_CLIENT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bazaar_client=info")),
        )
        .init();

    let args = Args::parse();
    let config = BazaarClientConfig::load(args.config)?;
    let api = Arc::new(ApiClient::new(&config)?);

    // A terminal session has no hidden state; the sender stays alive so
    // visibility tracking stays on.
    let (_visibility_tx, visibility_rx) = watch::channel(Visibility::Visible);

    let session = ClientSession::mount(api, PresenceConfig::from(&config), visibility_rx).await;
    if let Some(outcome) = session.role_sync() {
        tracing::info!(?outcome, "Role sync");
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for ctrl-c");
    }

    if let Some(stats) = session.unmount().await {
        tracing::info!(writes = stats.writes, failures = stats.failures, "Session unmounted");
    }
    Ok(())
}
