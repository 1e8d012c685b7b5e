//! Profile and presence routes of the caller.

use axum::{extract::State, Json};
use bazaar_core::Profile;

use crate::{
    error::{ApiError, ApiResult},
    extractors::ApiQuery,
    middleware::{AuthExtractor, OptionalAuth},
    services,
    state::AppState,
    types::{HeartbeatParams, HeartbeatResponse},
};

/// GET /api/v1/me - The caller's profile
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "Profile",
    responses(
        (status = 200, description = "Caller's profile", body = Profile),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Profile not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    State(state): State<AppState>,
    AuthExtractor(auth): AuthExtractor,
) -> ApiResult<Json<Profile>> {
    let store = state.stores.for_session(Some(auth.token()));
    store
        .profile_get(auth.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::profile_not_found(auth.user_id))
}

/// POST /api/v1/presence/heartbeat - Record that the caller is active
#[utoipa::path(
    post,
    path = "/api/v1/presence/heartbeat",
    tag = "Profile",
    params(HeartbeatParams),
    responses(
        (status = 200, description = "Heartbeat recorded or coalesced", body = HeartbeatResponse),
        (status = 400, description = "Unknown reason", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn heartbeat(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    ApiQuery(params): ApiQuery<HeartbeatParams>,
) -> ApiResult<Json<HeartbeatResponse>> {
    let response = services::record_heartbeat(
        state.stores.as_ref(),
        &state.presence,
        auth.as_ref(),
        params.reason.unwrap_or_default(),
    )
    .await?;
    Ok(Json(response))
}

pub fn create_presence_router() -> axum::Router<AppState> {
    axum::Router::new().route("/heartbeat", axum::routing::post(heartbeat))
}
