//! Review-related API types

use bazaar_core::{ProfileId, Review};
use serde::{Deserialize, Serialize};

/// Body of a review submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubmitReviewRequest {
    /// Star rating, 1 to 5
    pub rating: i64,
    /// Free-text comment; may be empty
    #[serde(default)]
    pub comment: String,
}

/// Reviews received by a seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SellerReviewsResponse {
    pub seller_id: ProfileId,
    pub reviews: Vec<Review>,
    /// Mean rating, absent when the seller has no reviews
    pub average_rating: Option<f64>,
    pub count: usize,
}

impl SellerReviewsResponse {
    pub fn new(seller_id: ProfileId, reviews: Vec<Review>) -> Self {
        let average_rating = bazaar_core::average_rating(reviews.iter().map(|r| &r.rating));
        Self {
            seller_id,
            count: reviews.len(),
            average_rating,
            reviews,
        }
    }
}
