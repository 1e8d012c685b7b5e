//! Presence Service
//!
//! Server side of the presence heartbeat. Several tabs of one user beat
//! independently; writes closer together than the coalescing window are
//! skipped so the profile row is written at most once per window. A beat
//! sent because a tab became visible is always written.

use bazaar_core::{ProfileId, Timestamp};
use bazaar_storage::StoreFactory;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::types::{BeatReason, HeartbeatResponse};

#[derive(Debug, Clone, Copy)]
struct Accepted {
    at: Instant,
    last_seen: Timestamp,
}

/// Per-user record of the last accepted heartbeat write.
#[derive(Debug)]
pub struct PresenceTracker {
    window: Duration,
    accepted: DashMap<ProfileId, Accepted>,
}

/// Decision for one heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Caller should write `last_seen`
    Write,
    /// A write inside the window already happened at this time
    Coalesced(Timestamp),
}

impl PresenceTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            accepted: DashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decide whether a heartbeat at `now` is written. Admission is atomic
    /// per user, so concurrent heartbeats admit exactly one writer.
    pub fn admit(&self, user: ProfileId, now: Instant, last_seen: Timestamp) -> Admission {
        match self.accepted.entry(user) {
            Entry::Occupied(mut entry) => {
                let previous = *entry.get();
                if now.saturating_duration_since(previous.at) < self.window {
                    Admission::Coalesced(previous.last_seen)
                } else {
                    entry.insert(Accepted { at: now, last_seen });
                    Admission::Write
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Accepted { at: now, last_seen });
                Admission::Write
            }
        }
    }

    /// Record a write at `now` regardless of the window.
    pub fn admit_forced(&self, user: ProfileId, now: Instant, last_seen: Timestamp) -> Admission {
        self.accepted.insert(user, Accepted { at: now, last_seen });
        Admission::Write
    }

    /// Drop an admission whose write failed so the next heartbeat retries.
    pub fn forget(&self, user: ProfileId, admitted_at: Instant) {
        self.accepted.remove_if(&user, |_, a| a.at == admitted_at);
    }

    /// Remove entries older than the window. Returns how many were removed.
    pub fn prune(&self, now: Instant) -> usize {
        let before = self.accepted.len();
        self.accepted
            .retain(|_, a| now.saturating_duration_since(a.at) < self.window);
        before.saturating_sub(self.accepted.len())
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Record a heartbeat for the caller.
pub async fn record_heartbeat(
    stores: &dyn StoreFactory,
    tracker: &PresenceTracker,
    auth: Option<&AuthContext>,
    reason: BeatReason,
) -> ApiResult<HeartbeatResponse> {
    let auth = auth.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    let now = Instant::now();
    let last_seen = chrono::Utc::now();

    let admission = if reason.bypasses_coalescing() {
        tracker.admit_forced(auth.user_id, now, last_seen)
    } else {
        tracker.admit(auth.user_id, now, last_seen)
    };

    match admission {
        Admission::Coalesced(previous) => {
            tracing::trace!(user_id = %auth.user_id, reason = reason.as_str(), "Heartbeat coalesced");
            Ok(HeartbeatResponse {
                written: false,
                last_seen: previous,
            })
        }
        Admission::Write => {
            let store = stores.for_session(Some(auth.token()));
            if let Err(e) = store.profile_touch_last_seen(auth.user_id, last_seen).await {
                tracker.forget(auth.user_id, now);
                tracing::warn!(user_id = %auth.user_id, error = %e, "Failed to record heartbeat");
                return Err(e.into());
            }
            Ok(HeartbeatResponse {
                written: true,
                last_seen,
            })
        }
    }
}
