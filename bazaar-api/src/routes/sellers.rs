//! Seller REST API Routes

use axum::{
    extract::State,
    Json,
};
use bazaar_core::ProfileId;

use crate::{
    error::{ApiError, ApiResult},
    extractors::PathId,
    middleware::AuthExtractor,
    state::AppState,
    types::SellerReviewsResponse,
};

/// GET /api/v1/sellers/{id}/reviews - Reviews received by a seller
#[utoipa::path(
    get,
    path = "/api/v1/sellers/{id}/reviews",
    tag = "Reviews",
    params(("id" = ProfileId, Path, description = "Seller profile ID")),
    responses(
        (status = 200, description = "Reviews with average rating", body = SellerReviewsResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Remote query failed", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_seller_reviews(
    State(state): State<AppState>,
    AuthExtractor(auth): AuthExtractor,
    PathId(seller_id): PathId<ProfileId>,
) -> ApiResult<Json<SellerReviewsResponse>> {
    let store = state.stores.for_session(Some(auth.token()));
    let reviews = store.review_list_by_seller(seller_id).await?;
    Ok(Json(SellerReviewsResponse::new(seller_id, reviews)))
}

pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new().route("/:id/reviews", axum::routing::get(list_seller_reviews))
}
