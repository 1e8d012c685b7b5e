//! REST API Routes Module
//!
//! Route handlers organized by resource:
//! - Orders and review submission
//! - Catalog (listings, categories)
//! - Seller reviews
//! - Admin (role sync, game request queue)
//! - Caller profile and presence heartbeat
//! - Health check endpoints (public)
//! - OpenAPI document (public)

pub mod admin;
pub mod health;
pub mod listings;
pub mod orders;
pub mod profile;
pub mod sellers;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::middleware::{auth_middleware, AuthMiddlewareState};
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub use admin::create_router as admin_router;
pub use health::create_router as health_router;
pub use listings::create_router as listings_router;
pub use orders::create_router as orders_router;
pub use sellers::create_router as sellers_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// Empty origins allow everything (development).
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricted origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter(|o| !o.starts_with("*."))
            .filter_map(|o| o.parse().ok())
            .collect();

        if config.cors_allow_credentials {
            cors.allow_origin(origins).allow_credentials(true)
        } else {
            cors.allow_origin(origins)
        }
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Routes under `/api/v1`, all behind the auth middleware.
fn build_api_routes(state: &AppState) -> Router<AppState> {
    let auth_state = AuthMiddlewareState::new(state.auth_config.clone());

    Router::new()
        .nest("/orders", orders::create_router())
        .nest("/listings", listings::create_router())
        .nest("/categories", listings::create_categories_router())
        .nest("/sellers", sellers::create_router())
        .nest("/admin", admin::create_router())
        .nest("/presence", profile::create_presence_router())
        .route("/me", get(profile::get_me))
        .layer(from_fn_with_state(auth_state, auth_middleware))
}

/// Create the complete API router.
///
/// - `/api/v1/*`: marketplace routes (bearer token required)
/// - `/health/*`: health checks (public)
/// - `/openapi.json`: OpenAPI document (public)
///
/// In production the auth and API configuration are validated first.
pub fn create_api_router(state: AppState, api_config: &ApiConfig) -> ApiResult<Router> {
    let is_production = api_config.is_production();
    state.auth_config.validate_for_production(is_production)?;
    api_config.validate_for_production()?;

    Ok(Router::new()
        .nest("/api/v1", build_api_routes(&state))
        .nest("/health", health::create_router())
        .route("/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(api_config))
        .with_state(state))
}
