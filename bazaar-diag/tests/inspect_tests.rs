//! Inspection passes against the in-memory store.

use bazaar_diag::{run_catalog, run_requests};
use bazaar_test_utils::fixtures::Marketplace;
use bazaar_test_utils::InMemoryStore;

async fn requests_output(store: &InMemoryStore, limit: u32) -> (bazaar_diag::Report, String) {
    let mut out = Vec::new();
    let report = run_requests(store, limit, &mut out).await.unwrap();
    (report, String::from_utf8(out).unwrap())
}

async fn catalog_output(store: &InMemoryStore, limit: u32) -> (bazaar_diag::Report, String) {
    let mut out = Vec::new();
    let report = run_catalog(store, limit, &mut out).await.unwrap();
    (report, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_requests_lists_rows_with_requester_and_role_counts() {
    let market = Marketplace::seeded();
    let (report, out) = requests_output(&market.store, 20).await;

    assert!(report.is_success());
    assert!(out.contains("game_requests: 2"));
    assert!(out.contains("Hades II by buyer@bazaar.market"));
    assert!(out.contains("Stardew Valley by outsider@bazaar.market"));
    assert!(out.contains("profiles[user]: 3"));
    assert!(out.contains("profiles[admin]: 1"));

    // Newest first.
    let hades = out.find("Hades II").unwrap();
    let stardew = out.find("Stardew Valley").unwrap();
    assert!(hades < stardew);
    assert_eq!(market.store.write_count(), 0);
}

#[tokio::test]
async fn test_requests_limit_caps_printed_rows() {
    let market = Marketplace::seeded();
    let (_, out) = requests_output(&market.store, 1).await;

    assert!(out.contains("game_requests: 2"));
    assert!(out.contains("Hades II"));
    assert!(!out.contains("Stardew Valley"));
}

#[tokio::test]
async fn test_catalog_lists_listing_with_category_and_media_count() {
    let market = Marketplace::seeded();
    let (report, out) = catalog_output(&market.store, 20).await;

    assert!(report.is_success());
    assert!(out.contains("categories: 1"));
    assert!(out.contains("listings: 1"));
    assert!(out.contains("listing_media: 2"));
    assert!(out.contains("Starter bundle [active] category=Game Keys media=2"));
}

#[tokio::test]
async fn test_failed_queries_are_reported_and_the_pass_continues() {
    let market = Marketplace::seeded();
    market.store.fail_reads(true);

    let (report, out) = catalog_output(&market.store, 20).await;
    assert_eq!(report.queries, 4);
    assert_eq!(report.failures, 4);
    assert!(!report.is_success());
    assert!(out.contains("categories: ERROR"));
    assert!(out.contains("listing_media: ERROR"));
    assert!(out.contains("listings rows: ERROR"));

    let (report, out) = requests_output(&market.store, 20).await;
    assert_eq!(report.failures, 4);
    assert!(out.contains("profiles[admin]: ERROR"));
}

#[tokio::test]
async fn test_empty_store_prints_zero_counts() {
    let store = InMemoryStore::new();
    let (report, out) = requests_output(&store, 20).await;
    assert!(report.is_success());
    assert!(out.contains("game_requests: 0"));
    assert!(out.contains("profiles[user]: 0"));
}
