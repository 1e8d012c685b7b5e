//! Malformed bodies, ids and query strings answer with the JSON error shape.

use axum::http::{Method, StatusCode};
use bazaar_test_utils::assertions::assert_no_writes;
use bazaar_test_utils::fixtures::Marketplace;
use bazaar_test_utils::tokens::mint_token;
use serde_json::json;

#[path = "support/app.rs"]
mod test_app_support;
use test_app_support::{send, test_app};

#[tokio::test]
async fn test_mistyped_review_body_is_invalid_input() {
    let market = Marketplace::seeded();
    let app = test_app(&market.store, "");
    let buyer = mint_token(market.buyer.id, None);
    let uri = format!("/api/v1/orders/{}/reviews", market.order.id);

    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(&buyer),
        Some(json!({ "rating": "five" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["message"].is_string());
    assert_no_writes(&market.store);
}

#[tokio::test]
async fn test_review_without_body_is_invalid_format() {
    let market = Marketplace::seeded();
    let app = test_app(&market.store, "");
    let buyer = mint_token(market.buyer.id, None);
    let uri = format!("/api/v1/orders/{}/reviews", market.order.id);

    let (status, body) = send(&app, Method::POST, &uri, Some(&buyer), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FORMAT");
    assert_no_writes(&market.store);
}

#[tokio::test]
async fn test_non_uuid_ids_are_invalid_format() {
    let market = Marketplace::seeded();
    let app = test_app(&market.store, "");
    let buyer = mint_token(market.buyer.id, None);

    for uri in [
        "/api/v1/orders/not-a-uuid",
        "/api/v1/listings/42",
        "/api/v1/sellers/someone/reviews",
    ] {
        let (status, body) = send(&app, Method::GET, uri, Some(&buyer), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "INVALID_FORMAT", "{uri}");
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/orders/not-a-uuid/reviews",
        Some(&buyer),
        Some(json!({ "rating": 5, "comment": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FORMAT");
    assert_no_writes(&market.store);
}

#[tokio::test]
async fn test_unknown_query_values_are_invalid_input() {
    let market = Marketplace::seeded();
    let app = test_app(&market.store, "admin@bazaar.market");
    let buyer = mint_token(market.buyer.id, None);
    let admin = mint_token(market.admin.id, Some("admin@bazaar.market"));

    let (status, body) = send(&app, Method::GET, "/api/v1/orders?role=admin", Some(&buyer), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) =
        send(&app, Method::GET, "/api/v1/listings?limit=lots", Some(&buyer), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/admin/game-requests?status=whatever",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}
