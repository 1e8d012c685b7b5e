//! Review Service
//!
//! Review submission for a completed purchase. Only the recorded buyer of
//! an order may review it, once.

use bazaar_core::{OrderId, Review, ReviewDraft, StoreError, ORDER_BUYER};
use bazaar_storage::StoreFactory;

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::revalidate::{order_path, Revalidator, ORDERS_PATH};
use crate::types::SubmitReviewRequest;

/// Submit a review for an order on behalf of the caller.
///
/// Fails with `Unauthorized` before touching the store when there is no
/// caller. On success the order detail and order list views are
/// revalidated.
pub async fn submit_review(
    stores: &dyn StoreFactory,
    revalidator: &dyn Revalidator,
    auth: Option<&AuthContext>,
    order_id: OrderId,
    request: &SubmitReviewRequest,
) -> ApiResult<Review> {
    let auth = auth.ok_or_else(|| ApiError::unauthorized("Sign in to review an order"))?;
    let draft = ReviewDraft::new(request.rating, &request.comment)?;

    let store = stores.for_session(Some(auth.token()));

    let order = store
        .order_get(order_id)
        .await
        .map_err(|e| {
            tracing::error!(order_id = %order_id, error = %e, "Failed to load order for review");
            ApiError::database_error("Failed to load order")
        })?
        .ok_or_else(|| ApiError::order_not_found(order_id))?;

    ORDER_BUYER.check(auth.user_id, &order).map_err(|e| {
        tracing::warn!(
            order_id = %order_id,
            user_id = %auth.user_id,
            "Review rejected: caller is not the buyer"
        );
        ApiError::from(e)
    })?;

    let existing = store.review_find_by_order(order_id).await.map_err(|e| {
        tracing::error!(order_id = %order_id, error = %e, "Failed to check existing review");
        ApiError::database_error("Failed to submit review")
    })?;
    if existing.is_some() {
        return Err(ApiError::review_already_exists(order_id));
    }

    let review = store
        .review_insert(&draft.into_new_review(&order))
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation { .. } => ApiError::review_already_exists(order_id),
            other => {
                tracing::error!(order_id = %order_id, error = %other, "Failed to insert review");
                ApiError::database_error("Failed to submit review")
            }
        })?;

    tracing::info!(
        order_id = %order_id,
        review_id = %review.id,
        rating = review.rating,
        "Review submitted"
    );

    revalidator
        .revalidate(&[order_path(order_id), ORDERS_PATH.to_string()])
        .await;

    Ok(review)
}

// =============================================================================
// TESTS
// =============================================================================
