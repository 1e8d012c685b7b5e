//! Bazaar Test Utilities
//!
//! Centralized test infrastructure for the Bazaar workspace:
//! - Access token minting against a known secret
//! - Test fixtures and a seeded marketplace scenario
//! - Proptest generators for identifiers and review input
//! - Custom assertions for store behavior

// Re-export the in-memory store from its source crate
pub use bazaar_storage::InMemoryStore;

// Re-export core types for convenience
pub use bazaar_core::{
    Category, CategoryId, EntityIdType, GameRequest, GameRequestId, GameRequestStatus, Listing,
    ListingId, ListingMedia, ListingStatus, MediaId, Order, OrderId, OrderStatus, Profile,
    ProfileId, Review, ReviewId, Role, StoreError, Timestamp,
};

// ============================================================================
// ACCESS TOKENS
// ============================================================================

pub mod tokens {
    use bazaar_core::ProfileId;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    /// Shared secret tests configure the API with. Long enough for production checks.
    pub const TEST_JWT_SECRET: &str = "bazaar-test-secret-0123456789abcdef0123456789";

    /// Pinned "now" for token checks, 2024-06-01T00:00:00Z.
    pub const TEST_NOW: i64 = 1_717_200_000;

    /// Lifetime of minted tokens.
    pub const TEST_TOKEN_TTL_SECS: i64 = 3600;

    /// HS256 token shaped like the remote auth service's access tokens.
    pub fn mint_token_at(
        secret: &str,
        user_id: ProfileId,
        email: Option<&str>,
        issued_at: i64,
        ttl_secs: i64,
    ) -> String {
        let mut claims = json!({
            "sub": user_id.to_string(),
            "iat": issued_at,
            "exp": issued_at + ttl_secs,
            "role": "authenticated",
            "aud": "authenticated",
        });
        if let Some(email) = email {
            claims["email"] = json!(email);
        }

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("HS256 encoding of JSON claims cannot fail")
    }

    /// Token for `user_id` valid at [`TEST_NOW`], signed with [`TEST_JWT_SECRET`].
    pub fn mint_token(user_id: ProfileId, email: Option<&str>) -> String {
        mint_token_at(TEST_JWT_SECRET, user_id, email, TEST_NOW, TEST_TOKEN_TTL_SECS)
    }

    /// Token that expired well outside any clock skew allowance.
    pub fn mint_expired_token(user_id: ProfileId) -> String {
        mint_token_at(
            TEST_JWT_SECRET,
            user_id,
            None,
            TEST_NOW - 10 * TEST_TOKEN_TTL_SECS,
            TEST_TOKEN_TTL_SECS,
        )
    }

    /// `Authorization` header value for a token.
    pub fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use bazaar_core::{
        EntityIdType, GameRequestStatus, OrderStatus, ProfileId, Role, MAX_RATING, MIN_RATING,
    };
    use proptest::prelude::*;
    use uuid::Uuid;

    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    pub fn arb_profile_id() -> impl Strategy<Value = ProfileId> {
        arb_uuid().prop_map(ProfileId::new)
    }

    /// Plausible email addresses, mixed case.
    pub fn arb_email() -> impl Strategy<Value = String> {
        ("[a-zA-Z][a-zA-Z0-9.]{0,15}", "[a-z]{2,10}", "(com|net|org|market)")
            .prop_map(|(local, domain, tld)| format!("{local}@{domain}.{tld}"))
    }

    pub fn arb_role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::User), Just(Role::Admin)]
    }

    pub fn arb_order_status() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::Pending),
            Just(OrderStatus::Paid),
            Just(OrderStatus::Delivered),
            Just(OrderStatus::Completed),
            Just(OrderStatus::Cancelled),
            Just(OrderStatus::Refunded),
        ]
    }

    pub fn arb_game_request_status() -> impl Strategy<Value = GameRequestStatus> {
        prop_oneof![
            Just(GameRequestStatus::Pending),
            Just(GameRequestStatus::Approved),
            Just(GameRequestStatus::Rejected),
        ]
    }

    pub fn arb_valid_rating() -> impl Strategy<Value = i64> {
        i64::from(MIN_RATING)..=i64::from(MAX_RATING)
    }

    pub fn arb_invalid_rating() -> impl Strategy<Value = i64> {
        prop_oneof![
            i64::MIN..i64::from(MIN_RATING),
            (i64::from(MAX_RATING) + 1)..=i64::MAX,
        ]
    }

    /// Review comments, including Thai text and surrounding whitespace.
    pub fn arb_comment() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[ a-zA-Z0-9.,!]{0,80}",
            Just("  สินค้าดีมาก ส่งไว  ".to_string()),
        ]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    /// Fixed timestamp for rows whose time does not matter.
    pub fn fixed_time() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    pub fn profile(role: Role, email: &str) -> Profile {
        Profile {
            id: ProfileId::now_v7(),
            email: Some(email.to_string()),
            display_name: Some(email.split('@').next().unwrap_or(email).to_string()),
            role,
            last_seen: None,
        }
    }

    pub fn user_profile(email: &str) -> Profile {
        profile(Role::User, email)
    }

    pub fn admin_profile(email: &str) -> Profile {
        profile(Role::Admin, email)
    }

    pub fn completed_order(buyer: ProfileId, seller: ProfileId) -> Order {
        Order {
            id: OrderId::now_v7(),
            listing_id: None,
            buyer_id: buyer,
            seller_id: seller,
            status: OrderStatus::Completed,
            created_at: fixed_time(),
        }
    }

    pub fn review(order: &Order, rating: i16) -> Review {
        Review {
            id: ReviewId::now_v7(),
            order_id: order.id,
            reviewer_id: order.buyer_id,
            seller_id: order.seller_id,
            rating,
            comment_th: None,
            created_at: fixed_time(),
        }
    }

    pub fn category(name: &str) -> Category {
        Category {
            id: CategoryId::now_v7(),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
        }
    }

    pub fn listing(seller: ProfileId, category: Option<CategoryId>, title: &str) -> Listing {
        Listing {
            id: ListingId::now_v7(),
            seller_id: seller,
            category_id: category,
            title: title.to_string(),
            price: 100.0,
            status: ListingStatus::Active,
            created_at: fixed_time(),
        }
    }

    pub fn media(listing: ListingId, position: i32) -> ListingMedia {
        ListingMedia {
            id: MediaId::now_v7(),
            listing_id: listing,
            url: format!("https://cdn.bazaar.market/{listing}/{position}.jpg"),
            position,
        }
    }

    /// Game request created `age_mins` minutes before [`fixed_time`].
    pub fn game_request(user: ProfileId, name: &str, age_mins: i64) -> GameRequest {
        GameRequest {
            id: GameRequestId::now_v7(),
            user_id: user,
            game_name: name.to_string(),
            details: None,
            status: GameRequestStatus::Pending,
            created_at: fixed_time() - Duration::minutes(age_mins),
            requester: None,
        }
    }

    /// A small marketplace: one order between `buyer` and `seller`, a third
    /// user with no stake in it, and an admin.
    #[derive(Debug, Clone)]
    pub struct Marketplace {
        pub store: InMemoryStore,
        pub buyer: Profile,
        pub seller: Profile,
        pub outsider: Profile,
        pub admin: Profile,
        pub order: Order,
        pub category: Category,
        pub listing: Listing,
    }

    impl Marketplace {
        pub fn seeded() -> Self {
            let store = InMemoryStore::new();
            let buyer = user_profile("buyer@bazaar.market");
            let seller = user_profile("seller@bazaar.market");
            let outsider = user_profile("outsider@bazaar.market");
            let admin = admin_profile("admin@bazaar.market");

            let category = category("Game Keys");
            let listing = listing(seller.id, Some(category.id), "Starter bundle");
            let mut order = completed_order(buyer.id, seller.id);
            order.listing_id = Some(listing.id);

            for p in [&buyer, &seller, &outsider, &admin] {
                store.put_profile(p.clone());
            }
            store.put_category(category.clone());
            store.put_listing(listing.clone());
            store.put_media(media(listing.id, 1));
            store.put_media(media(listing.id, 0));
            store.put_order(order.clone());
            store.put_game_request(game_request(outsider.id, "Stardew Valley", 30));
            store.put_game_request(game_request(buyer.id, "Hades II", 5));

            Self {
                store,
                buyer,
                seller,
                outsider,
                admin,
                order,
                category,
                listing,
            }
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    use super::*;

    /// Assert that no store call of any kind happened.
    pub fn assert_store_untouched(store: &InMemoryStore) {
        assert_eq!(
            store.operation_count(),
            0,
            "expected no store operations, observed {}",
            store.operation_count()
        );
    }

    /// Assert that no write reached the store.
    pub fn assert_no_writes(store: &InMemoryStore) {
        assert_eq!(
            store.write_count(),
            0,
            "expected no writes, observed {}",
            store.write_count()
        );
    }

    pub fn assert_unique_violation<T: std::fmt::Debug>(result: &Result<T, StoreError>) {
        assert!(
            matches!(result, Err(StoreError::UniqueViolation { .. })),
            "expected UniqueViolation, got {:?}",
            result
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::Marketplace;
    use super::tokens::*;
    use bazaar_core::EntityIdType;
    use bazaar_storage::StoreFactory;

    #[test]
    fn test_minted_token_has_three_segments() {
        let token = mint_token(bazaar_core::ProfileId::now_v7(), Some("a@b.co"));
        assert_eq!(token.split('.').count(), 3);
        assert!(bearer(&token).starts_with("Bearer "));
    }

    #[tokio::test]
    async fn test_seeded_marketplace_is_readable() {
        let market = Marketplace::seeded();
        let store = market.store.for_session(None);

        let order = store.order_get(market.order.id).await.unwrap().unwrap();
        assert_eq!(order.buyer_id, market.buyer.id);
        assert!(market.store.peek_profile(market.admin.id).unwrap().role.is_admin());
        super::assertions::assert_no_writes(&market.store);
    }
}
