//! Router wiring shared by the HTTP integration tests.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use bazaar_api::{
    create_api_router, ApiConfig, AppState, AuthConfig, BroadcastRevalidator, FixedClock,
};
use bazaar_core::AdminAllowList;
use bazaar_storage::InMemoryStore;
use bazaar_test_utils::tokens::{bearer, TEST_JWT_SECRET, TEST_NOW};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub revalidations: Arc<BroadcastRevalidator>,
}

/// Full API router over `store`, with tokens checked against the pinned test clock.
pub fn test_app(store: &InMemoryStore, admin_emails: &str) -> TestApp {
    let api_config = ApiConfig {
        admin_emails: AdminAllowList::from_csv(admin_emails),
        ..ApiConfig::default()
    };
    let auth_config = Arc::new(AuthConfig::with_secret(
        TEST_JWT_SECRET,
        Arc::new(FixedClock(TEST_NOW)),
    ));
    let revalidations = Arc::new(BroadcastRevalidator::default());

    let state = AppState::new(
        Arc::new(store.clone()),
        auth_config,
        &api_config,
        revalidations.clone(),
    );
    let router = create_api_router(state, &api_config).expect("router builds in development");

    TestApp {
        router,
        revalidations,
    }
}

/// Send one request; returns the status and the JSON body (`Null` when empty or not JSON).
pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", bearer(token));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request");

    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
