//! Row shapes for the remote marketplace tables.
//!
//! Field names match the remote column names so rows deserialize directly
//! from the data service's JSON.

use crate::{
    CategoryId, GameRequestId, GameRequestStatus, ListingId, ListingStatus, MediaId, OrderId,
    OrderStatus, ProfileId, ReviewId, Role, Timestamp,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// PROFILES
// ============================================================================

/// User identity record. Created externally on signup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Profile {
    pub id: ProfileId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub last_seen: Option<Timestamp>,
}

impl Profile {
    /// Compact view used when a profile is embedded in another row.
    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
        }
    }
}

/// Profile columns embedded in joined reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProfileSummary {
    pub id: ProfileId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

// ============================================================================
// ORDERS & REVIEWS
// ============================================================================

/// Buyer/seller transaction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub listing_id: Option<ListingId>,
    pub buyer_id: ProfileId,
    pub seller_id: ProfileId,
    pub status: OrderStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl Order {
    /// True when the profile is the buyer or the seller of this order.
    pub fn involves(&self, profile: ProfileId) -> bool {
        self.buyer_id == profile || self.seller_id == profile
    }
}

/// Review row as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Review {
    pub id: ReviewId,
    pub order_id: OrderId,
    pub reviewer_id: ProfileId,
    pub seller_id: ProfileId,
    pub rating: i16,
    #[serde(default)]
    pub comment_th: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

/// Insert payload for a review. The remote service assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub order_id: OrderId,
    pub reviewer_id: ProfileId,
    pub seller_id: ProfileId,
    pub rating: i16,
    pub comment_th: Option<String>,
}

// ============================================================================
// GAME REQUESTS
// ============================================================================

/// User-submitted request, moderated by admins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GameRequest {
    pub id: GameRequestId,
    pub user_id: ProfileId,
    pub game_name: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub status: GameRequestStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    /// Requester profile, present when the read joins `profiles`.
    #[serde(default)]
    pub requester: Option<ProfileSummary>,
}

// ============================================================================
// CATALOG
// ============================================================================

/// Listing category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Catalog listing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Listing {
    pub id: ListingId,
    pub seller_id: ProfileId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub title: String,
    pub price: f64,
    pub status: ListingStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

/// Image or video attached to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListingMedia {
    pub id: MediaId,
    pub listing_id: ListingId,
    pub url: String,
    #[serde(default)]
    pub position: i32,
}

/// Listing joined with its category and media, as rendered by catalog pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub media: Vec<ListingMedia>,
}

impl ListingDetail {
    /// Sort media by display position; the remote embed does not guarantee order.
    pub fn with_sorted_media(mut self) -> Self {
        self.media.sort_by_key(|m| m.position);
        self
    }
}
