//! In-memory store for tests and local development.
//!
//! Row-level policies of the remote service are not modelled: every session
//! sees every row. The uniqueness of reviews per order is enforced, and
//! every trait call is counted so tests can assert that a code path never
//! touched the store.

use crate::store::{ListingQuery, MarketplaceStore, StoreFactory, StoreResult};
use ::async_trait::async_trait;
use bazaar_core::{
    Category, CategoryId, EntityIdType, EntityType, GameRequest, GameRequestId,
    GameRequestStatus, ListingDetail, ListingId, ListingMedia, Listing, MediaId, NewReview, Order,
    OrderId, OrderParty, Profile, ProfileId, Review, ReviewId, Role, StoreError, Timestamp,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Table<K, V> = Arc<RwLock<HashMap<K, V>>>;

/// Shared in-memory tables. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    profiles: Table<ProfileId, Profile>,
    orders: Table<OrderId, Order>,
    reviews: Table<ReviewId, Review>,
    listings: Table<ListingId, Listing>,
    categories: Table<CategoryId, Category>,
    media: Table<MediaId, ListingMedia>,
    game_requests: Table<GameRequestId, GameRequest>,
    operations: Arc<AtomicU64>,
    writes: Arc<AtomicU64>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

fn read<K, V>(table: &Table<K, V>) -> StoreResult<RwLockReadGuard<'_, HashMap<K, V>>> {
    table.read().map_err(|_| StoreError::LockPoisoned)
}

fn write<K, V>(table: &Table<K, V>) -> StoreResult<RwLockWriteGuard<'_, HashMap<K, V>>> {
    table.write().map_err(|_| StoreError::LockPoisoned)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // SEEDING (not counted as operations)
    // ========================================================================

    pub fn put_profile(&self, profile: Profile) {
        if let Ok(mut t) = write(&self.profiles) {
            t.insert(profile.id, profile);
        }
    }

    pub fn put_order(&self, order: Order) {
        if let Ok(mut t) = write(&self.orders) {
            t.insert(order.id, order);
        }
    }

    pub fn put_review(&self, review: Review) {
        if let Ok(mut t) = write(&self.reviews) {
            t.insert(review.id, review);
        }
    }

    pub fn put_category(&self, category: Category) {
        if let Ok(mut t) = write(&self.categories) {
            t.insert(category.id, category);
        }
    }

    pub fn put_listing(&self, listing: Listing) {
        if let Ok(mut t) = write(&self.listings) {
            t.insert(listing.id, listing);
        }
    }

    pub fn put_media(&self, media: ListingMedia) {
        if let Ok(mut t) = write(&self.media) {
            t.insert(media.id, media);
        }
    }

    pub fn put_game_request(&self, request: GameRequest) {
        if let Ok(mut t) = write(&self.game_requests) {
            t.insert(request.id, request);
        }
    }

    // ========================================================================
    // INSPECTION
    // ========================================================================

    /// Number of trait calls observed, reads and writes alike.
    pub fn operation_count(&self) -> u64 {
        self.operations.load(Ordering::SeqCst)
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn review_count(&self) -> usize {
        read(&self.reviews).map(|t| t.len()).unwrap_or(0)
    }

    /// Snapshot of a profile without counting an operation.
    pub fn peek_profile(&self, id: ProfileId) -> Option<Profile> {
        read(&self.profiles).ok().and_then(|t| t.get(&id).cloned())
    }

    /// Make every subsequent read fail with `Unavailable`.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail with `Unavailable`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn begin_read(&self) -> StoreResult<()> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "injected read failure".to_string(),
            });
        }
        Ok(())
    }

    fn begin_write(&self) -> StoreResult<()> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "injected write failure".to_string(),
            });
        }
        Ok(())
    }

    fn committed(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn detail(&self, listing: Listing) -> StoreResult<ListingDetail> {
        let category = match listing.category_id {
            Some(id) => read(&self.categories)?.get(&id).cloned(),
            None => None,
        };
        let media = read(&self.media)?
            .values()
            .filter(|m| m.listing_id == listing.id)
            .cloned()
            .collect();
        Ok(ListingDetail {
            listing,
            category,
            media,
        }
        .with_sorted_media())
    }
}

#[async_trait]
impl MarketplaceStore for InMemoryStore {
    async fn profile_get(&self, id: ProfileId) -> StoreResult<Option<Profile>> {
        self.begin_read()?;
        Ok(read(&self.profiles)?.get(&id).cloned())
    }

    async fn profile_set_role(&self, id: ProfileId, role: Role) -> StoreResult<Profile> {
        self.begin_write()?;
        let mut profiles = write(&self.profiles)?;
        let profile = profiles.get_mut(&id).ok_or(StoreError::NotFound {
            entity_type: EntityType::Profile,
            id: id.as_uuid(),
        })?;
        profile.role = role;
        let updated = profile.clone();
        drop(profiles);
        self.committed();
        Ok(updated)
    }

    async fn profile_touch_last_seen(&self, id: ProfileId, at: Timestamp) -> StoreResult<()> {
        self.begin_write()?;
        let mut profiles = write(&self.profiles)?;
        let profile = profiles.get_mut(&id).ok_or(StoreError::NotFound {
            entity_type: EntityType::Profile,
            id: id.as_uuid(),
        })?;
        profile.last_seen = Some(at);
        drop(profiles);
        self.committed();
        Ok(())
    }

    async fn profile_count_by_role(&self, role: Role) -> StoreResult<u64> {
        self.begin_read()?;
        Ok(read(&self.profiles)?
            .values()
            .filter(|p| p.role == role)
            .count() as u64)
    }

    async fn order_get(&self, id: OrderId) -> StoreResult<Option<Order>> {
        self.begin_read()?;
        Ok(read(&self.orders)?.get(&id).cloned())
    }

    async fn order_list_for(
        &self,
        profile: ProfileId,
        party: Option<OrderParty>,
    ) -> StoreResult<Vec<Order>> {
        self.begin_read()?;
        let mut orders: Vec<Order> = read(&self.orders)?
            .values()
            .filter(|o| match party {
                Some(OrderParty::Buyer) => o.buyer_id == profile,
                Some(OrderParty::Seller) => o.seller_id == profile,
                None => o.involves(profile),
            })
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn review_find_by_order(&self, order: OrderId) -> StoreResult<Option<Review>> {
        self.begin_read()?;
        Ok(read(&self.reviews)?
            .values()
            .find(|r| r.order_id == order)
            .cloned())
    }

    async fn review_insert(&self, review: &NewReview) -> StoreResult<Review> {
        self.begin_write()?;
        let mut reviews = write(&self.reviews)?;
        if reviews.values().any(|r| r.order_id == review.order_id) {
            return Err(StoreError::UniqueViolation {
                entity_type: EntityType::Review,
                reason: format!("review for order {} already exists", review.order_id),
            });
        }
        let row = Review {
            id: ReviewId::now_v7(),
            order_id: review.order_id,
            reviewer_id: review.reviewer_id,
            seller_id: review.seller_id,
            rating: review.rating,
            comment_th: review.comment_th.clone(),
            created_at: chrono::Utc::now(),
        };
        reviews.insert(row.id, row.clone());
        drop(reviews);
        self.committed();
        Ok(row)
    }

    async fn review_list_by_seller(&self, seller: ProfileId) -> StoreResult<Vec<Review>> {
        self.begin_read()?;
        let mut reviews: Vec<Review> = read(&self.reviews)?
            .values()
            .filter(|r| r.seller_id == seller)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn listing_list(&self, query: &ListingQuery) -> StoreResult<Vec<ListingDetail>> {
        self.begin_read()?;
        let category = match &query.category_slug {
            Some(slug) => match read(&self.categories)?.values().find(|c| &c.slug == slug) {
                Some(c) => Some(c.id),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        let mut listings: Vec<Listing> = read(&self.listings)?
            .values()
            .filter(|l| query.status.map_or(true, |s| l.status == s))
            .filter(|l| category.is_none() || l.category_id == category)
            .cloned()
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        listings
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit.min(ListingQuery::MAX_LIMIT) as usize)
            .map(|l| self.detail(l))
            .collect()
    }

    async fn listing_get(&self, id: ListingId) -> StoreResult<Option<ListingDetail>> {
        self.begin_read()?;
        let listing = read(&self.listings)?.get(&id).cloned();
        listing.map(|l| self.detail(l)).transpose()
    }

    async fn category_list(&self) -> StoreResult<Vec<Category>> {
        self.begin_read()?;
        let mut categories: Vec<Category> = read(&self.categories)?.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn game_request_list(
        &self,
        status: Option<GameRequestStatus>,
        limit: Option<u32>,
    ) -> StoreResult<Vec<GameRequest>> {
        self.begin_read()?;
        let profiles = read(&self.profiles)?;
        let mut requests: Vec<GameRequest> = read(&self.game_requests)?
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .map(|mut r| {
                r.requester = profiles.get(&r.user_id).map(Profile::summary);
                r
            })
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            requests.truncate(limit as usize);
        }
        Ok(requests)
    }

    async fn count(&self, entity: EntityType) -> StoreResult<u64> {
        self.begin_read()?;
        let n = match entity {
            EntityType::Profile => read(&self.profiles)?.len(),
            EntityType::Order => read(&self.orders)?.len(),
            EntityType::Review => read(&self.reviews)?.len(),
            EntityType::Listing => read(&self.listings)?.len(),
            EntityType::Category => read(&self.categories)?.len(),
            EntityType::ListingMedia => read(&self.media)?.len(),
            EntityType::GameRequest => read(&self.game_requests)?.len(),
        };
        Ok(n as u64)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.begin_read()
    }
}

impl StoreFactory for InMemoryStore {
    fn for_session(&self, _access_token: Option<&str>) -> Arc<dyn MarketplaceStore> {
        Arc::new(self.clone())
    }
}
