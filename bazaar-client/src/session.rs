//! Signed-in session lifecycle.
//!
//! Mounting runs the one-off admin role sync and starts the presence
//! heartbeat; unmounting stops the heartbeat.

use crate::api_client::ApiClient;
use crate::presence::{PresenceConfig, PresenceHandle, PresenceHeartbeat, PresenceSnapshot, Visibility};
use bazaar_core::RoleSyncOutcome;
use std::sync::Arc;
use tokio::sync::watch;

pub struct ClientSession {
    role_sync: Option<RoleSyncOutcome>,
    presence: Option<PresenceHandle>,
}

impl ClientSession {
    /// Mount the session effects.
    ///
    /// Without a session nothing is contacted and no heartbeat runs. A failed
    /// role sync is logged and leaves the outcome empty.
    pub async fn mount(
        api: Arc<ApiClient>,
        config: PresenceConfig,
        visibility: watch::Receiver<Visibility>,
    ) -> Self {
        if !api.has_session() {
            tracing::info!("No session; presence and role sync disabled");
            return Self {
                role_sync: None,
                presence: None,
            };
        }

        let role_sync = match api.sync_admin_role().await {
            Ok(outcome) => {
                if let Some(outcome) = outcome {
                    tracing::info!(?outcome, "Admin role sync complete");
                }
                outcome
            }
            Err(e) => {
                tracing::warn!(error = %e, "Admin role sync failed");
                None
            }
        };

        let presence = PresenceHeartbeat::spawn(api, config, visibility);

        Self {
            role_sync,
            presence: Some(presence),
        }
    }

    pub fn role_sync(&self) -> Option<RoleSyncOutcome> {
        self.role_sync
    }

    pub fn presence_stats(&self) -> Option<PresenceSnapshot> {
        self.presence.as_ref().map(PresenceHandle::stats)
    }

    /// Stop the heartbeat and return its final counters.
    pub async fn unmount(self) -> Option<PresenceSnapshot> {
        match self.presence {
            Some(handle) => Some(handle.stop().await),
            None => None,
        }
    }
}
