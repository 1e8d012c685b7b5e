//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use bazaar_core::AdminAllowList;
use bazaar_storage::StoreFactory;

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::revalidate::Revalidator;
use crate::services::PresenceTracker;

/// Application-wide state shared across all routes. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    /// Hands out stores scoped to the caller's access token.
    pub stores: Arc<dyn StoreFactory>,
    pub auth_config: Arc<AuthConfig>,
    pub admin_emails: Arc<AdminAllowList>,
    pub revalidator: Arc<dyn Revalidator>,
    pub presence: Arc<PresenceTracker>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        stores: Arc<dyn StoreFactory>,
        auth_config: Arc<AuthConfig>,
        api_config: &ApiConfig,
        revalidator: Arc<dyn Revalidator>,
    ) -> Self {
        Self {
            stores,
            auth_config,
            admin_emails: Arc::new(api_config.admin_emails.clone()),
            revalidator,
            presence: Arc::new(PresenceTracker::new(api_config.presence_coalesce)),
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(Arc<dyn StoreFactory>, stores);
crate::impl_from_ref!(Arc<AuthConfig>, auth_config);
crate::impl_from_ref!(Arc<AdminAllowList>, admin_emails);
crate::impl_from_ref!(Arc<dyn Revalidator>, revalidator);
crate::impl_from_ref!(Arc<PresenceTracker>, presence);
crate::impl_from_ref!(Instant, start_time);
