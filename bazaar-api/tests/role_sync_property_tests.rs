//! Property-Based Tests for Admin Role Sync
//!
//! An email outside the allow-list never causes a write, an allow-listed
//! email matches regardless of case and surrounding whitespace, and a sync
//! that already ran is a no-op.

use axum::http::{Method, StatusCode};
use bazaar_test_utils::assertions::assert_no_writes;
use bazaar_test_utils::fixtures::{user_profile, Marketplace};
use bazaar_test_utils::generators::arb_email;
use bazaar_test_utils::tokens::mint_token;
use bazaar_test_utils::InMemoryStore;
use proptest::prelude::*;
use tokio::runtime::Runtime;

#[path = "support/app.rs"]
mod test_app_support;
use test_app_support::{send, test_app};

const ALLOW_LIST: &str = "owner@bazaar.market, Ops@Bazaar.Market";

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

#[tokio::test]
async fn test_allow_listed_user_is_promoted_once() {
    let store = InMemoryStore::new();
    let profile = user_profile("ops@bazaar.market");
    store.put_profile(profile.clone());
    let app = test_app(&store, ALLOW_LIST);
    let mut stale = app.revalidations.subscribe();

    let token = mint_token(profile.id, Some("  OPS@bazaar.market "));
    let (status, body) = send(&app, Method::POST, "/api/v1/admin/role-sync", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "promoted");
    assert_eq!(store.write_count(), 1);
    assert!(store.peek_profile(profile.id).map(|p| p.role.is_admin()).unwrap_or(false));
    assert_eq!(stale.try_recv().map(|v| v.path).ok().as_deref(), Some("/admin"));

    let (status, body) = send(&app, Method::POST, "/api/v1/admin/role-sync", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "already_admin");
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_token_without_email_is_not_eligible() {
    let market = Marketplace::seeded();
    let app = test_app(&market.store, "buyer@bazaar.market");

    let token = mint_token(market.buyer.id, None);
    let (status, body) = send(&app, Method::POST, "/api/v1/admin/role-sync", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "not_eligible");
    assert_eq!(market.store.operation_count(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// For any email outside the allow-list, role sync SHALL report
    /// `not_eligible` and SHALL NOT write.
    #[test]
    fn prop_non_allow_listed_email_never_writes(email in arb_email()) {
        let normalized = email.trim().to_lowercase();
        prop_assume!(normalized != "owner@bazaar.market" && normalized != "ops@bazaar.market");

        let rt = test_runtime()?;
        rt.block_on(async {
            let store = InMemoryStore::new();
            let profile = user_profile(&email);
            store.put_profile(profile.clone());
            let app = test_app(&store, ALLOW_LIST);

            let token = mint_token(profile.id, Some(&email));
            let (status, body) =
                send(&app, Method::POST, "/api/v1/admin/role-sync", Some(&token), None).await;

            prop_assert_eq!(status, StatusCode::OK);
            prop_assert_eq!(body["outcome"].as_str(), Some("not_eligible"));
            assert_no_writes(&store);
            prop_assert_eq!(store.peek_profile(profile.id).map(|p| p.role), Some(profile.role));
            Ok(())
        })?;
    }
}
