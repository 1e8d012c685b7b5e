//! Client against a live Bazaar API router backed by the in-memory store.

use std::sync::Arc;

use bazaar_api::{create_api_router, ApiConfig, AppState, AuthConfig, ErrorCode, FixedClock, NoopRevalidator};
use bazaar_client::{
    ApiClient, BazaarClientConfig, ClientError, ClientSession, PresenceConfig, Visibility,
};
use bazaar_core::{AdminAllowList, RoleSyncOutcome};
use bazaar_storage::InMemoryStore;
use bazaar_test_utils::fixtures::Marketplace;
use bazaar_test_utils::tokens::{mint_token, TEST_JWT_SECRET, TEST_NOW};
use secrecy::SecretString;
use std::time::Duration;
use tokio::sync::watch;

async fn serve(store: &InMemoryStore, admin_emails: &str) -> String {
    let api_config = ApiConfig {
        admin_emails: AdminAllowList::from_csv(admin_emails),
        ..ApiConfig::default()
    };
    let auth_config = Arc::new(AuthConfig::with_secret(
        TEST_JWT_SECRET,
        Arc::new(FixedClock(TEST_NOW)),
    ));
    let state = AppState::new(
        Arc::new(store.clone()),
        auth_config,
        &api_config,
        Arc::new(NoopRevalidator),
    );
    let app = create_api_router(state, &api_config).expect("router");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

fn client(base_url: &str, token: Option<String>) -> ApiClient {
    let config = BazaarClientConfig {
        api_base_url: base_url.to_string(),
        bearer_token: token.map(|t| SecretString::new(t.into())),
        request_timeout_ms: 5_000,
        heartbeat_interval_secs: 60,
    };
    ApiClient::new(&config).expect("client")
}

#[tokio::test]
async fn test_role_sync_promotes_allow_listed_user() {
    let market = Marketplace::seeded();
    let base = serve(&market.store, "seller@bazaar.market").await;

    let token = mint_token(market.seller.id, market.seller.email.as_deref());
    let api = client(&base, Some(token));

    assert_eq!(api.sync_admin_role().await.unwrap(), Some(RoleSyncOutcome::Promoted));
    assert_eq!(api.sync_admin_role().await.unwrap(), Some(RoleSyncOutcome::AlreadyAdmin));
    assert!(api.me().await.unwrap().role.is_admin());
}

#[tokio::test]
async fn test_role_sync_for_other_users_is_not_eligible() {
    let market = Marketplace::seeded();
    let base = serve(&market.store, "seller@bazaar.market").await;

    let token = mint_token(market.buyer.id, market.buyer.email.as_deref());
    let api = client(&base, Some(token));

    assert_eq!(api.sync_admin_role().await.unwrap(), Some(RoleSyncOutcome::NotEligible));
    assert_eq!(market.store.write_count(), 0);
}

#[tokio::test]
async fn test_structured_errors_are_surfaced() {
    let market = Marketplace::seeded();
    let base = serve(&market.store, "").await;

    let token = mint_token(market.outsider.id, None);
    let api = client(&base, Some(token));

    let err = api.submit_review(market.order.id, 5, "great").await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::Forbidden));
    assert!(matches!(err, ClientError::Api { status: 403, .. }));
    assert_eq!(market.store.review_count(), 0);

    let buyer = client(&base, Some(mint_token(market.buyer.id, None)));
    let review = buyer.submit_review(market.order.id, 5, "great").await.unwrap();
    assert_eq!(review.reviewer_id, market.buyer.id);
    assert_eq!(review.seller_id, market.seller.id);
    assert_eq!(review.rating, 5);
}

#[tokio::test]
async fn test_session_mount_writes_presence_and_unmount_stops() {
    let market = Marketplace::seeded();
    let base = serve(&market.store, "").await;

    let token = mint_token(market.buyer.id, market.buyer.email.as_deref());
    let api = Arc::new(client(&base, Some(token)));
    let (_vis_tx, vis_rx) = watch::channel(Visibility::Visible);

    let session = ClientSession::mount(
        api,
        PresenceConfig {
            interval: Duration::from_secs(3600),
        },
        vis_rx,
    )
    .await;
    assert_eq!(session.role_sync(), Some(RoleSyncOutcome::NotEligible));

    // Wait for the mount write to land.
    for _ in 0..50 {
        if session.presence_stats().map(|s| s.attempts()).unwrap_or(0) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let stats = session.unmount().await.expect("presence was running");
    assert_eq!(stats.writes, 1);
    assert!(market.store.peek_profile(market.buyer.id).unwrap().last_seen.is_some());
}

#[tokio::test]
async fn test_session_without_token_contacts_nothing() {
    let market = Marketplace::seeded();
    let base = serve(&market.store, "").await;

    let api = Arc::new(client(&base, None));
    let (_vis_tx, vis_rx) = watch::channel(Visibility::Visible);
    let session = ClientSession::mount(api, PresenceConfig::default(), vis_rx).await;

    assert_eq!(session.role_sync(), None);
    assert!(session.presence_stats().is_none());
    assert!(session.unmount().await.is_none());
    assert_eq!(market.store.operation_count(), 0);
}
