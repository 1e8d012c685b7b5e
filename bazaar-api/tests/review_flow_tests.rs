//! Review submission over HTTP.
//!
//! Only the buyer of an order may review it, at most once, and a successful
//! review marks the order views stale.

use axum::http::{Method, StatusCode};
use bazaar_core::{EntityIdType, OrderId};
use bazaar_test_utils::fixtures::Marketplace;
use bazaar_test_utils::tokens::mint_token;
use serde_json::json;

#[path = "support/app.rs"]
mod test_app_support;
use test_app_support::{send, test_app};

fn review_uri(market: &Marketplace) -> String {
    format!("/api/v1/orders/{}/reviews", market.order.id)
}

#[tokio::test]
async fn test_non_buyer_is_forbidden_then_buyer_creates_one_review() {
    let market = Marketplace::seeded();
    let app = test_app(&market.store, "");
    let mut stale = app.revalidations.subscribe();

    let outsider = mint_token(market.outsider.id, market.outsider.email.as_deref());
    let (status, body) = send(
        &app,
        Method::POST,
        &review_uri(&market),
        Some(&outsider),
        Some(json!({ "rating": 5, "comment": "great" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    assert_eq!(market.store.review_count(), 0);
    assert!(stale.try_recv().is_err());

    let buyer = mint_token(market.buyer.id, market.buyer.email.as_deref());
    let (status, body) = send(
        &app,
        Method::POST,
        &review_uri(&market),
        Some(&buyer),
        Some(json!({ "rating": 5, "comment": "  great  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rating"], 5);
    assert_eq!(body["comment_th"], "great");
    assert_eq!(body["reviewer_id"], market.buyer.id.to_string());
    assert_eq!(body["seller_id"], market.seller.id.to_string());
    assert_eq!(market.store.review_count(), 1);

    let first = stale.try_recv().expect("order detail view marked stale");
    assert_eq!(first.path, format!("/orders/{}", market.order.id));
    let second = stale.try_recv().expect("orders list marked stale");
    assert_eq!(second.path, "/orders");
}

#[tokio::test]
async fn test_second_review_conflicts() {
    let market = Marketplace::seeded();
    let app = test_app(&market.store, "");
    let buyer = mint_token(market.buyer.id, None);
    let uri = review_uri(&market);

    let body = json!({ "rating": 4 });
    let (first, _) = send(&app, Method::POST, &uri, Some(&buyer), Some(body.clone())).await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, err) = send(&app, Method::POST, &uri, Some(&buyer), Some(body)).await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(err["code"], "REVIEW_ALREADY_EXISTS");
    assert_eq!(market.store.review_count(), 1);
}

#[tokio::test]
async fn test_out_of_range_rating_touches_nothing() {
    let market = Marketplace::seeded();
    let app = test_app(&market.store, "");
    let buyer = mint_token(market.buyer.id, None);

    for rating in [0, 6, -3] {
        let (status, body) = send(
            &app,
            Method::POST,
            &review_uri(&market),
            Some(&buyer),
            Some(json!({ "rating": rating })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_RANGE");
    }
    assert_eq!(market.store.operation_count(), 0);
}

#[tokio::test]
async fn test_review_of_unknown_order_is_not_found() {
    let market = Marketplace::seeded();
    let app = test_app(&market.store, "");
    let buyer = mint_token(market.buyer.id, None);

    let uri = format!("/api/v1/orders/{}/reviews", OrderId::now_v7());
    let (status, body) = send(&app, Method::POST, &uri, Some(&buyer), Some(json!({ "rating": 3 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ORDER_NOT_FOUND");
    assert_eq!(market.store.review_count(), 0);
}

#[tokio::test]
async fn test_seller_reviews_include_average() {
    let market = Marketplace::seeded();
    let app = test_app(&market.store, "");
    let buyer = mint_token(market.buyer.id, None);

    let (status, _) = send(
        &app,
        Method::POST,
        &review_uri(&market),
        Some(&buyer),
        Some(json!({ "rating": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/v1/sellers/{}/reviews", market.seller.id);
    let (status, body) = send(&app, Method::GET, &uri, Some(&buyer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["average_rating"], 4.0);
}
