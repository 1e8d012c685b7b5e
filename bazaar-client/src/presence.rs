//! Presence heartbeat task.
//!
//! Writes once when started, once per interval tick and once each time the
//! page becomes visible again. Each write carries its [`BeatReason`]; the
//! server never coalesces a visibility write away. Stopping or dropping the
//! handle ends the task and no write is issued afterwards.

use crate::api_client::ApiClient;
use crate::config::BazaarClientConfig;
use crate::error::ClientResult;
use async_trait::async_trait;
use bazaar_api::types::BeatReason;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

// ============================================================================
// SINK
// ============================================================================

/// Destination of heartbeat writes.
#[async_trait]
pub trait PresenceSink: Send + Sync + 'static {
    async fn beat(&self, reason: BeatReason) -> ClientResult<()>;
}

#[async_trait]
impl PresenceSink for ApiClient {
    async fn beat(&self, reason: BeatReason) -> ClientResult<()> {
        self.heartbeat(reason).await.map(|_| ())
    }
}

/// Page visibility as reported by the embedding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct PresenceConfig {
    pub interval: Duration,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

impl From<&BazaarClientConfig> for PresenceConfig {
    fn from(config: &BazaarClientConfig) -> Self {
        Self {
            interval: config.heartbeat_interval(),
        }
    }
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Default)]
pub struct PresenceStats {
    /// Heartbeats the sink accepted
    pub writes: AtomicU64,

    /// Heartbeats the sink rejected
    pub failures: AtomicU64,
}

impl PresenceStats {
    pub fn snapshot(&self) -> PresenceSnapshot {
        PresenceSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresenceSnapshot {
    pub writes: u64,
    pub failures: u64,
}

impl PresenceSnapshot {
    pub fn attempts(&self) -> u64 {
        self.writes + self.failures
    }
}

// ============================================================================
// TASK
// ============================================================================

/// Owner of a running heartbeat task.
pub struct PresenceHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    stats: Arc<PresenceStats>,
}

impl PresenceHandle {
    pub fn stats(&self) -> PresenceSnapshot {
        self.stats.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the task and wait for it to finish.
    pub async fn stop(mut self) -> PresenceSnapshot {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Presence task ended abnormally");
            }
        }
        self.stats.snapshot()
    }
}

impl Drop for PresenceHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub struct PresenceHeartbeat;

impl PresenceHeartbeat {
    /// Start the heartbeat for the current session.
    ///
    /// The first write happens immediately. Closing the visibility channel
    /// stops visibility tracking but not the interval.
    pub fn spawn<S: PresenceSink>(
        sink: Arc<S>,
        config: PresenceConfig,
        visibility: watch::Receiver<Visibility>,
    ) -> PresenceHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(PresenceStats::default());
        let task = tokio::spawn(run(sink, config, visibility, shutdown_rx, stats.clone()));

        PresenceHandle {
            shutdown_tx,
            task: Some(task),
            stats,
        }
    }
}

async fn run<S: PresenceSink>(
    sink: Arc<S>,
    config: PresenceConfig,
    mut visibility: watch::Receiver<Visibility>,
    mut shutdown_rx: watch::Receiver<bool>,
    stats: Arc<PresenceStats>,
) {
    tracing::debug!(interval_secs = config.interval.as_secs(), "Presence heartbeat started");

    beat(sink.as_ref(), &stats, BeatReason::Mount).await;

    // The mount write covers the interval's immediate first tick.
    let mut ticker = interval_at(Instant::now() + config.interval, config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut current = *visibility.borrow_and_update();
    let mut tracking_visibility = true;

    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }

            _ = ticker.tick() => {
                beat(sink.as_ref(), &stats, BeatReason::Interval).await;
            }

            changed = visibility.changed(), if tracking_visibility => {
                match changed {
                    Ok(()) => {
                        let next = *visibility.borrow_and_update();
                        if next == Visibility::Visible && current != Visibility::Visible {
                            beat(sink.as_ref(), &stats, BeatReason::Visible).await;
                        }
                        current = next;
                    }
                    Err(_) => tracking_visibility = false,
                }
            }
        }
    }

    tracing::debug!("Presence heartbeat stopped");
}

async fn beat<S: PresenceSink + ?Sized>(sink: &S, stats: &PresenceStats, reason: BeatReason) {
    match sink.beat(reason).await {
        Ok(()) => {
            stats.writes.fetch_add(1, Ordering::Relaxed);
        }
        Err(e) => {
            stats.failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, reason = reason.as_str(), "Presence heartbeat failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex;

    const INTERVAL: Duration = Duration::from_secs(60);

    #[derive(Default)]
    struct CountingSink {
        calls: AtomicU64,
        fail: AtomicBool,
        reasons: Mutex<Vec<BeatReason>>,
    }

    impl CountingSink {
        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }

        fn reasons(&self) -> Vec<BeatReason> {
            self.reasons.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PresenceSink for CountingSink {
        async fn beat(&self, reason: BeatReason) -> ClientResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reasons.lock().unwrap().push(reason);
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::InvalidResponse("HTTP 503".to_string()));
            }
            Ok(())
        }
    }

    fn config() -> PresenceConfig {
        PresenceConfig { interval: INTERVAL }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_on_mount_and_each_tick() {
        let sink = Arc::new(CountingSink::default());
        let (_vis_tx, vis_rx) = watch::channel(Visibility::Visible);
        let handle = PresenceHeartbeat::spawn(sink.clone(), config(), vis_rx);

        settle().await;
        assert_eq!(sink.calls(), 1);

        tokio::time::sleep(INTERVAL - Duration::from_secs(2)).await;
        assert_eq!(sink.calls(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(sink.calls(), 2);

        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(sink.calls(), 5);

        let stats = handle.stop().await;
        assert_eq!(stats.writes, 5);
        assert_eq!(stats.failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_on_transition_to_visible_only() {
        let sink = Arc::new(CountingSink::default());
        let (vis_tx, vis_rx) = watch::channel(Visibility::Visible);
        let handle = PresenceHeartbeat::spawn(sink.clone(), config(), vis_rx);
        settle().await;
        assert_eq!(sink.calls(), 1);

        // Visible while already visible is not a transition.
        vis_tx.send(Visibility::Visible).unwrap();
        settle().await;
        assert_eq!(sink.calls(), 1);

        vis_tx.send(Visibility::Hidden).unwrap();
        settle().await;
        assert_eq!(sink.calls(), 1);

        vis_tx.send(Visibility::Visible).unwrap();
        settle().await;
        assert_eq!(sink.calls(), 2);

        drop(handle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_write_carries_its_trigger() {
        let sink = Arc::new(CountingSink::default());
        let (vis_tx, vis_rx) = watch::channel(Visibility::Visible);
        let handle = PresenceHeartbeat::spawn(sink.clone(), config(), vis_rx);
        settle().await;

        vis_tx.send(Visibility::Hidden).unwrap();
        settle().await;
        vis_tx.send(Visibility::Visible).unwrap();
        settle().await;
        tokio::time::sleep(INTERVAL).await;

        let stats = handle.stop().await;
        assert_eq!(stats.writes, 3);
        assert_eq!(
            sink.reasons(),
            vec![BeatReason::Mount, BeatReason::Visible, BeatReason::Interval]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_writes_after_stop() {
        let sink = Arc::new(CountingSink::default());
        let (vis_tx, vis_rx) = watch::channel(Visibility::Visible);
        let handle = PresenceHeartbeat::spawn(sink.clone(), config(), vis_rx);
        settle().await;

        let stats = handle.stop().await;
        assert_eq!(stats.writes, 1);

        let _ = vis_tx.send(Visibility::Hidden);
        let _ = vis_tx.send(Visibility::Visible);
        tokio::time::sleep(INTERVAL * 5).await;
        assert_eq!(sink.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_writes_after_drop() {
        let sink = Arc::new(CountingSink::default());
        let (_vis_tx, vis_rx) = watch::channel(Visibility::Visible);
        let handle = PresenceHeartbeat::spawn(sink.clone(), config(), vis_rx);
        settle().await;
        assert!(handle.is_running());

        drop(handle);
        tokio::time::sleep(INTERVAL * 5).await;
        assert_eq!(sink.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_counted_without_backoff() {
        let sink = Arc::new(CountingSink::default());
        sink.fail.store(true, Ordering::SeqCst);
        let (_vis_tx, vis_rx) = watch::channel(Visibility::Visible);
        let handle = PresenceHeartbeat::spawn(sink.clone(), config(), vis_rx);

        settle().await;
        tokio::time::sleep(INTERVAL * 2).await;
        assert_eq!(handle.stats().failures, 3);
        assert_eq!(handle.stats().writes, 0);

        sink.fail.store(false, Ordering::SeqCst);
        tokio::time::sleep(INTERVAL).await;
        let stats = handle.stop().await;
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.attempts(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_visibility_channel_keeps_interval() {
        let sink = Arc::new(CountingSink::default());
        let (vis_tx, vis_rx) = watch::channel(Visibility::Hidden);
        let handle = PresenceHeartbeat::spawn(sink.clone(), config(), vis_rx);
        settle().await;

        drop(vis_tx);
        tokio::time::sleep(INTERVAL).await;
        assert_eq!(sink.calls(), 2);
        assert!(handle.is_running());
        drop(handle);
    }
}
