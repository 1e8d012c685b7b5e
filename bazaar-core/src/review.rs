//! Review input validation.

use crate::{NewReview, Order, ValidationError};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;
pub const MAX_COMMENT_CHARS: usize = 2000;

/// Validated review input: rating in range, comment trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    rating: i16,
    comment: String,
}

impl ReviewDraft {
    pub fn new(rating: i64, comment: &str) -> Result<Self, ValidationError> {
        if !(i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&rating) {
            return Err(ValidationError::OutOfRange {
                field: "rating".to_string(),
                value: rating,
                min: MIN_RATING.into(),
                max: MAX_RATING.into(),
            });
        }

        let comment = comment.trim();
        let chars = comment.chars().count();
        if chars > MAX_COMMENT_CHARS {
            return Err(ValidationError::InvalidValue {
                field: "comment".to_string(),
                reason: format!("{chars} characters exceeds limit of {MAX_COMMENT_CHARS}"),
            });
        }

        Ok(Self {
            // Range checked above.
            rating: rating as i16,
            comment: comment.to_string(),
        })
    }

    pub fn rating(&self) -> i16 {
        self.rating
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Insert payload for `order`, attributed to its buyer and seller.
    pub fn into_new_review(self, order: &Order) -> NewReview {
        NewReview {
            order_id: order.id,
            reviewer_id: order.buyer_id,
            seller_id: order.seller_id,
            rating: self.rating,
            comment_th: Some(self.comment),
        }
    }
}

/// Average rating over a set of reviews, `None` when empty.
pub fn average_rating<'a, I>(ratings: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a i16>,
{
    let (sum, count) = ratings
        .into_iter()
        .fold((0i64, 0u32), |(s, c), r| (s + i64::from(*r), c + 1));
    if count == 0 {
        None
    } else {
        Some(sum as f64 / f64::from(count))
    }
}
