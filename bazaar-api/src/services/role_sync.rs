//! Admin Role Synchronization
//!
//! Promotes allow-listed users to the admin role. The allow-list is server
//! configuration and never leaves this process.

use bazaar_core::{AdminAllowList, Role, RoleSyncOutcome};
use bazaar_storage::StoreFactory;

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::revalidate::{Revalidator, ADMIN_PATH};

/// Bring the caller's stored role in line with the allow-list.
///
/// Writes only when the caller is allow-listed and not yet an admin.
pub async fn sync_admin_role(
    stores: &dyn StoreFactory,
    revalidator: &dyn Revalidator,
    allow_list: &AdminAllowList,
    auth: Option<&AuthContext>,
) -> ApiResult<RoleSyncOutcome> {
    let auth = auth.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let eligible = auth
        .email
        .as_deref()
        .is_some_and(|email| allow_list.contains(email));
    if !eligible {
        tracing::debug!(user_id = %auth.user_id, "Role sync: not on allow-list");
        return Ok(RoleSyncOutcome::NotEligible);
    }

    let store = stores.for_session(Some(auth.token()));
    let profile = store
        .profile_get(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::profile_not_found(auth.user_id))?;

    if profile.role.is_admin() {
        return Ok(RoleSyncOutcome::AlreadyAdmin);
    }

    store.profile_set_role(auth.user_id, Role::Admin).await?;
    tracing::info!(user_id = %auth.user_id, "Promoted allow-listed user to admin");

    revalidator.revalidate(&[ADMIN_PATH.to_string()]).await;

    Ok(RoleSyncOutcome::Promoted)
}
