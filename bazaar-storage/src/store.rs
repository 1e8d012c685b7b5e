//! Async store trait over the remote marketplace tables.
//!
//! Handlers never talk HTTP directly. Each request obtains a session-scoped
//! store from a [`StoreFactory`] so the remote service applies its row-level
//! policies with the caller's token.

use ::async_trait::async_trait;
use bazaar_core::{
    Category, EntityType, GameRequest, GameRequestStatus, ListingDetail, ListingId,
    ListingStatus, NewReview, Order, OrderId, OrderParty, Profile, ProfileId, Review, Role,
    StoreError, Timestamp,
};
use std::sync::Arc;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Filter for catalog reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// Only listings in the category with this slug
    pub category_slug: Option<String>,
    /// Only listings with this status; `None` reads every status
    pub status: Option<ListingStatus>,
    pub limit: u32,
    pub offset: u32,
}

impl ListingQuery {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 200;

    /// Active listings only, as shown on the public catalog.
    pub fn active() -> Self {
        Self {
            status: Some(ListingStatus::Active),
            ..Self::default()
        }
    }
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            category_slug: None,
            status: None,
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Store for marketplace entities.
#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    // ========================================================================
    // PROFILES
    // ========================================================================

    async fn profile_get(&self, id: ProfileId) -> StoreResult<Option<Profile>>;

    /// Overwrite the stored role. Fails with `NotFound` when no row matches.
    async fn profile_set_role(&self, id: ProfileId, role: Role) -> StoreResult<Profile>;

    async fn profile_touch_last_seen(&self, id: ProfileId, at: Timestamp) -> StoreResult<()>;

    async fn profile_count_by_role(&self, role: Role) -> StoreResult<u64>;

    // ========================================================================
    // ORDERS & REVIEWS
    // ========================================================================

    async fn order_get(&self, id: OrderId) -> StoreResult<Option<Order>>;

    /// Orders where the profile is on the given side, or either side when
    /// `party` is `None`. Newest first.
    async fn order_list_for(
        &self,
        profile: ProfileId,
        party: Option<OrderParty>,
    ) -> StoreResult<Vec<Order>>;

    async fn review_find_by_order(&self, order: OrderId) -> StoreResult<Option<Review>>;

    /// Insert a review. A second review for the same order fails with
    /// `UniqueViolation`.
    async fn review_insert(&self, review: &NewReview) -> StoreResult<Review>;

    async fn review_list_by_seller(&self, seller: ProfileId) -> StoreResult<Vec<Review>>;

    // ========================================================================
    // CATALOG
    // ========================================================================

    async fn listing_list(&self, query: &ListingQuery) -> StoreResult<Vec<ListingDetail>>;

    async fn listing_get(&self, id: ListingId) -> StoreResult<Option<ListingDetail>>;

    /// All categories ordered by name.
    async fn category_list(&self) -> StoreResult<Vec<Category>>;

    // ========================================================================
    // MODERATION
    // ========================================================================

    /// Game requests joined with their requester, newest first.
    async fn game_request_list(
        &self,
        status: Option<GameRequestStatus>,
        limit: Option<u32>,
    ) -> StoreResult<Vec<GameRequest>>;

    // ========================================================================
    // UTILITY
    // ========================================================================

    /// Exact row count of a table.
    async fn count(&self, entity: EntityType) -> StoreResult<u64>;

    /// Cheap reachability check.
    async fn ping(&self) -> StoreResult<()>;
}

/// Hands out stores scoped to a session's access token.
pub trait StoreFactory: Send + Sync {
    /// `None` yields an anonymous store.
    fn for_session(&self, access_token: Option<&str>) -> Arc<dyn MarketplaceStore>;
}
