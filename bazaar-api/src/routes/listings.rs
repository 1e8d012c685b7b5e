//! Catalog REST API Routes
//!
//! Listings joined with category and ordered media, and the category list.

use axum::{
    extract::State,
    Json,
};
use bazaar_core::{ListingDetail, ListingId};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiQuery, PathId},
    middleware::AuthExtractor,
    state::AppState,
    types::{ListCategoriesResponse, ListListingsParams, ListListingsResponse},
};

/// GET /api/v1/listings - Active listings
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    tag = "Catalog",
    params(ListListingsParams),
    responses(
        (status = 200, description = "Active listings", body = ListListingsResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Remote query failed", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_listings(
    State(state): State<AppState>,
    AuthExtractor(auth): AuthExtractor,
    ApiQuery(params): ApiQuery<ListListingsParams>,
) -> ApiResult<Json<ListListingsResponse>> {
    let query = params.to_query();
    let store = state.stores.for_session(Some(auth.token()));
    let listings = store.listing_list(&query).await?;

    Ok(Json(ListListingsResponse {
        listings,
        limit: query.limit,
        offset: query.offset,
    }))
}

/// GET /api/v1/listings/{id} - One listing
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}",
    tag = "Catalog",
    params(("id" = ListingId, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing found", body = ListingDetail),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Listing not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_listing(
    State(state): State<AppState>,
    AuthExtractor(auth): AuthExtractor,
    PathId(id): PathId<ListingId>,
) -> ApiResult<Json<ListingDetail>> {
    let store = state.stores.for_session(Some(auth.token()));
    store
        .listing_get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::listing_not_found(id))
}

/// GET /api/v1/categories - All categories by name
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "Catalog",
    responses(
        (status = 200, description = "Categories", body = ListCategoriesResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthExtractor(auth): AuthExtractor,
) -> ApiResult<Json<ListCategoriesResponse>> {
    let store = state.stores.for_session(Some(auth.token()));
    let categories = store.category_list().await?;
    Ok(Json(ListCategoriesResponse { categories }))
}

pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", axum::routing::get(list_listings))
        .route("/:id", axum::routing::get(get_listing))
}

pub fn create_categories_router() -> axum::Router<AppState> {
    axum::Router::new().route("/", axum::routing::get(list_categories))
}
