//! Admin REST API Routes
//!
//! Role synchronization for allow-listed users and the game request
//! moderation queue.

use axum::{
    extract::State,
    Json,
};
use bazaar_core::require_admin;

use crate::{
    error::{ApiError, ApiResult},
    extractors::ApiQuery,
    middleware::{AuthExtractor, OptionalAuth},
    services,
    state::AppState,
    types::{ListGameRequestsParams, ListGameRequestsResponse, RoleSyncResponse},
};

/// POST /api/v1/admin/role-sync - Promote the caller if allow-listed
#[utoipa::path(
    post,
    path = "/api/v1/admin/role-sync",
    tag = "Admin",
    responses(
        (status = 200, description = "Sync outcome", body = RoleSyncResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Caller has no profile", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn role_sync(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
) -> ApiResult<Json<RoleSyncResponse>> {
    let outcome = services::sync_admin_role(
        state.stores.as_ref(),
        state.revalidator.as_ref(),
        &state.admin_emails,
        auth.as_ref(),
    )
    .await?;
    Ok(Json(RoleSyncResponse { outcome }))
}

/// GET /api/v1/admin/game-requests - Moderation queue, newest first
#[utoipa::path(
    get,
    path = "/api/v1/admin/game-requests",
    tag = "Admin",
    params(ListGameRequestsParams),
    responses(
        (status = 200, description = "Game requests with requester", body = ListGameRequestsResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Admin role required", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_game_requests(
    State(state): State<AppState>,
    AuthExtractor(auth): AuthExtractor,
    ApiQuery(params): ApiQuery<ListGameRequestsParams>,
) -> ApiResult<Json<ListGameRequestsResponse>> {
    let store = state.stores.for_session(Some(auth.token()));

    let profile = store
        .profile_get(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("Admin role required"))?;
    require_admin(&profile)?;

    let requests = store.game_request_list(params.status, params.capped_limit()).await?;
    Ok(Json(ListGameRequestsResponse {
        total: requests.len(),
        requests,
    }))
}

pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/role-sync", axum::routing::post(role_sync))
        .route("/game-requests", axum::routing::get(list_game_requests))
}
