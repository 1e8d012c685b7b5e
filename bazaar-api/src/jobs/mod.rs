//! Background Jobs for the Bazaar API
//!
//! - `presence_prune`: removes stale entries from the presence tracker
//!
//! Jobs are spawned during server startup and stopped through a `watch`
//! shutdown channel:
//!
//! ```ignore
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! tokio::spawn(presence_prune_task(tracker, PresencePruneConfig::from_env(), shutdown_rx));
//! let _ = shutdown_tx.send(true);
//! ```

pub mod presence_prune;

pub use presence_prune::{
    presence_prune_task, PresencePruneConfig, PresencePruneMetrics, PresencePruneSnapshot,
};
