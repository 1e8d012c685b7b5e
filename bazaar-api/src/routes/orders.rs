//! Order REST API Routes
//!
//! Orders are read-only here; the one mutation is review submission.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bazaar_core::{check_any, OrderId, ORDER_BUYER, ORDER_SELLER};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiQuery, PathId},
    middleware::{AuthExtractor, OptionalAuth},
    services,
    state::AppState,
    types::{ListOrdersParams, ListOrdersResponse, SubmitReviewRequest},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/orders - Orders of the caller
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "Orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Caller's orders, newest first", body = ListOrdersResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Remote query failed", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    AuthExtractor(auth): AuthExtractor,
    ApiQuery(params): ApiQuery<ListOrdersParams>,
) -> ApiResult<Json<ListOrdersResponse>> {
    let store = state.stores.for_session(Some(auth.token()));
    let orders = store.order_list_for(auth.user_id, params.role).await?;
    Ok(Json(orders.into()))
}

/// GET /api/v1/orders/{id} - One order, visible to its buyer and seller
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    params(("id" = OrderId, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = bazaar_core::Order),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Caller is neither buyer nor seller", body = ApiError),
        (status = 404, description = "Order not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    AuthExtractor(auth): AuthExtractor,
    PathId(id): PathId<OrderId>,
) -> ApiResult<impl IntoResponse> {
    let store = state.stores.for_session(Some(auth.token()));
    let order = store
        .order_get(id)
        .await?
        .ok_or_else(|| ApiError::order_not_found(id))?;

    check_any(&[ORDER_BUYER, ORDER_SELLER], auth.user_id, &order)
        .map_err(|_| ApiError::forbidden("Only the buyer or seller may view this order"))?;

    Ok(Json(order))
}

/// POST /api/v1/orders/{id}/reviews - Review an order as its buyer
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/reviews",
    tag = "Reviews",
    params(("id" = OrderId, Path, description = "Order ID")),
    request_body = SubmitReviewRequest,
    responses(
        (status = 201, description = "Review created", body = bazaar_core::Review),
        (status = 400, description = "Invalid rating or comment", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Caller is not the buyer", body = ApiError),
        (status = 404, description = "Order not found", body = ApiError),
        (status = 409, description = "Order already reviewed", body = ApiError),
        (status = 500, description = "Failed to submit review", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_review(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    PathId(order_id): PathId<OrderId>,
    ApiJson(req): ApiJson<SubmitReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    let review = services::submit_review(
        state.stores.as_ref(),
        state.revalidator.as_ref(),
        auth.as_ref(),
        order_id,
        &req,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", axum::routing::get(list_orders))
        .route("/:id", axum::routing::get(get_order))
        .route("/:id/reviews", axum::routing::post(submit_review))
}
