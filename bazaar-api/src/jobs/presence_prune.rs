//! Presence Prune Background Task
//!
//! The presence tracker keeps one entry per user who sent a heartbeat.
//! Entries older than the coalescing window carry no information, so this
//! task removes them periodically to keep the map bounded by the number of
//! recently active users.
//!
//! ```ignore
//! use bazaar_api::jobs::{presence_prune_task, PresencePruneConfig};
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! tokio::spawn(presence_prune_task(tracker, PresencePruneConfig::default(), shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

use crate::constants::PRESENCE_PRUNE_INTERVAL_SECS;
use crate::services::PresenceTracker;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct PresencePruneConfig {
    /// How often to prune (default: 5 minutes)
    pub check_interval: Duration,
}

impl Default for PresencePruneConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(PRESENCE_PRUNE_INTERVAL_SECS),
        }
    }
}

impl PresencePruneConfig {
    /// # Environment Variables
    /// - `BAZAAR_PRESENCE_PRUNE_INTERVAL_SECS` (default: 300)
    pub fn from_env() -> Self {
        let check_interval = Duration::from_secs(
            std::env::var("BAZAAR_PRESENCE_PRUNE_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(PRESENCE_PRUNE_INTERVAL_SECS),
        );
        Self { check_interval }
    }
}

// ============================================================================
// METRICS
// ============================================================================

#[derive(Debug, Default)]
pub struct PresencePruneMetrics {
    /// Total entries removed since startup
    pub entries_pruned: AtomicU64,

    /// Total prune cycles completed
    pub prune_cycles: AtomicU64,
}

impl PresencePruneMetrics {
    pub fn snapshot(&self) -> PresencePruneSnapshot {
        PresencePruneSnapshot {
            entries_pruned: self.entries_pruned.load(Ordering::Relaxed),
            prune_cycles: self.prune_cycles.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresencePruneSnapshot {
    pub entries_pruned: u64,
    pub prune_cycles: u64,
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Prune the presence tracker until the shutdown signal is received.
///
/// Returns the metrics collected during the task's lifetime.
pub async fn presence_prune_task(
    tracker: Arc<PresenceTracker>,
    config: PresencePruneConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Arc<PresencePruneMetrics> {
    let metrics = Arc::new(PresencePruneMetrics::default());

    let mut prune_interval = interval(config.check_interval);
    prune_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        check_interval_secs = config.check_interval.as_secs(),
        window_secs = tracker.window().as_secs(),
        "Presence prune task started"
    );

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // A dropped sender also means shutdown.
                if changed.is_err() || *shutdown_rx.borrow() {
                    tracing::info!("Presence prune task shutting down");
                    break;
                }
            }

            _ = prune_interval.tick() => {
                let removed = tracker.prune(tokio::time::Instant::now().into_std());
                metrics.prune_cycles.fetch_add(1, Ordering::Relaxed);
                metrics.entries_pruned.fetch_add(removed as u64, Ordering::Relaxed);
                if removed > 0 {
                    tracing::debug!(removed, remaining = tracker.len(), "Pruned presence entries");
                }
            }
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        entries_pruned = snapshot.entries_pruned,
        prune_cycles = snapshot.prune_cycles,
        "Presence prune task completed"
    );

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{EntityIdType, ProfileId};

    #[test]
    fn test_config_default() {
        let config = PresencePruneConfig::default();
        assert_eq!(
            config.check_interval,
            Duration::from_secs(PRESENCE_PRUNE_INTERVAL_SECS)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_prunes_and_stops_on_shutdown() {
        let tracker = Arc::new(PresenceTracker::new(Duration::from_secs(15)));
        let start = tokio::time::Instant::now().into_std();
        tracker.admit(ProfileId::now_v7(), start, chrono::Utc::now());
        tracker.admit(ProfileId::now_v7(), start, chrono::Utc::now());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let config = PresencePruneConfig {
            check_interval: Duration::from_secs(30),
        };
        let handle = tokio::spawn(presence_prune_task(tracker.clone(), config, shutdown_rx));

        // First tick fires immediately; the second one prunes.
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(tracker.is_empty());

        shutdown_tx.send(true).unwrap();
        let metrics = handle.await.unwrap().snapshot();
        assert_eq!(metrics.entries_pruned, 2);
        assert!(metrics.prune_cycles >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_stops_task() {
        let tracker = Arc::new(PresenceTracker::new(Duration::from_secs(15)));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(presence_prune_task(
            tracker,
            PresencePruneConfig::default(),
            shutdown_rx,
        ));
        drop(shutdown_tx);
        assert_eq!(handle.await.unwrap().snapshot().entries_pruned, 0);
    }
}
