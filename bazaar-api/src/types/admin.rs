//! Admin API types

use crate::constants::MAX_PAGE_SIZE;
use bazaar_core::{GameRequest, GameRequestStatus, RoleSyncOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RoleSyncResponse {
    pub outcome: RoleSyncOutcome,
}

/// Query parameters of the moderation queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListGameRequestsParams {
    pub status: Option<GameRequestStatus>,
    pub limit: Option<u32>,
}

impl ListGameRequestsParams {
    /// Requested page size clamped to `1..=MAX_PAGE_SIZE`; `None` reads the whole queue.
    pub fn capped_limit(&self) -> Option<u32> {
        self.limit.map(|l| l.clamp(1, MAX_PAGE_SIZE))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListGameRequestsResponse {
    pub requests: Vec<GameRequest>,
    pub total: usize,
}
