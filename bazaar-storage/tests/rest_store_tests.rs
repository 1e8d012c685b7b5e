//! RestStore against a local stand-in for the remote REST surface.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use bazaar_core::{EntityIdType, EntityType, NewReview, OrderId, ProfileId, StoreError};
use bazaar_storage::{MarketplaceStore, RemoteConfig, RestClient};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Seen {
    requests: Arc<Mutex<Vec<(HeaderMap, HashMap<String, String>)>>>,
}

impl Seen {
    fn record(&self, headers: &HeaderMap, params: &HashMap<String, String>) {
        self.requests
            .lock()
            .unwrap()
            .push((headers.clone(), params.clone()));
    }

    fn last(&self) -> (HeaderMap, HashMap<String, String>) {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

const ORDER_ID: &str = "00000000-0000-0000-0000-0000000000a1";
const BUYER_ID: &str = "00000000-0000-0000-0000-0000000000b1";
const SELLER_ID: &str = "00000000-0000-0000-0000-0000000000c1";

async fn orders(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    seen.record(&headers, &params);
    if params.get("id") == Some(&format!("eq.{ORDER_ID}")) {
        Json(json!([{
            "id": ORDER_ID,
            "listing_id": null,
            "buyer_id": BUYER_ID,
            "seller_id": SELLER_ID,
            "status": "completed",
            "created_at": "2026-03-01T10:00:00Z"
        }]))
    } else {
        Json(json!([]))
    }
}

async fn reviews_insert(State(seen): State<Seen>, headers: HeaderMap) -> impl IntoResponse {
    seen.record(&headers, &HashMap::new());
    (
        StatusCode::CONFLICT,
        Json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"reviews_order_id_key\"",
            "details": "Key (order_id) already exists.",
            "hint": null
        })),
    )
}

async fn categories(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    seen.record(&headers, &params);
    ([("content-range", "0-0/7")], Json(json!([{"id": "x"}])))
}

async fn broken() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"code": "XX000", "message": "boom"})),
    )
}

async fn spawn_remote() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/rest/v1/orders", get(orders))
        .route("/rest/v1/reviews", axum::routing::post(reviews_insert))
        .route("/rest/v1/categories", get(categories))
        .route("/rest/v1/listings", get(broken))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

fn client(url: &str) -> RestClient {
    RestClient::new(&RemoteConfig::new(url, "anon-key")).unwrap()
}

#[tokio::test]
async fn order_get_sends_session_token_and_filter() {
    let (url, seen) = spawn_remote().await;
    let store = client(&url).store(Some("user-token"));

    let id: OrderId = ORDER_ID.parse().unwrap();
    let order = store.order_get(id).await.unwrap().expect("order row");
    assert_eq!(order.buyer_id, BUYER_ID.parse::<ProfileId>().unwrap());

    let (headers, params) = seen.last();
    assert_eq!(headers["apikey"], "anon-key");
    assert_eq!(headers["authorization"], "Bearer user-token");
    assert_eq!(params.get("limit").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn anonymous_store_uses_anon_key_as_bearer() {
    let (url, seen) = spawn_remote().await;
    let store = client(&url).store(None);

    let missing = store.order_get(OrderId::now_v7()).await.unwrap();
    assert!(missing.is_none());

    let (headers, _) = seen.last();
    assert_eq!(headers["authorization"], "Bearer anon-key");
}

#[tokio::test]
async fn unique_violation_is_classified() {
    let (url, seen) = spawn_remote().await;
    let store = client(&url).store(Some("user-token"));

    let review = NewReview {
        order_id: ORDER_ID.parse().unwrap(),
        reviewer_id: BUYER_ID.parse().unwrap(),
        seller_id: SELLER_ID.parse().unwrap(),
        rating: 5,
        comment_th: Some("great".to_string()),
    };
    let err = store.review_insert(&review).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::UniqueViolation { entity_type: EntityType::Review, .. }
    ));

    let (headers, _) = seen.last();
    assert_eq!(headers["prefer"], "return=representation");
}

#[tokio::test]
async fn count_reads_content_range() {
    let (url, seen) = spawn_remote().await;
    let store = client(&url).store(None);

    assert_eq!(store.count(EntityType::Category).await.unwrap(), 7);
    let (headers, _) = seen.last();
    assert_eq!(headers["prefer"], "count=exact");
}

#[tokio::test]
async fn failed_read_is_error_not_empty() {
    let (url, _) = spawn_remote().await;
    let store = client(&url).store(None);

    let err = store
        .listing_list(&bazaar_storage::ListingQuery::active())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Remote { status: 500, .. }));
}

#[tokio::test]
async fn unreachable_remote_is_unavailable() {
    let store = client("http://127.0.0.1:1").store(None);
    let err = store.ping().await.unwrap_err();
    assert!(err.is_transient());
}
