//! Bazaar API - HTTP Layer for the Marketplace
//!
//! Axum server in front of the remote data service. Every request runs with
//! the caller's access token, so row-level policies on the remote side see
//! the same identity the API authenticated. Mutations pass the ownership
//! checks in `bazaar_core::policy` first and mark rendered views stale
//! afterwards.

#[macro_use]
mod macros;

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod extractors;
pub mod jobs;
pub mod middleware;
pub mod openapi;
pub mod revalidate;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use auth::{
    authenticate, authenticate_jwt, generate_jwt_token, validate_jwt_token, AuthConfig,
    AuthContext, Claims, FixedClock, JwtClock, JwtSecret, SystemClock,
};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use extractors::{ApiJson, ApiQuery, PathId};
pub use jobs::{presence_prune_task, PresencePruneConfig, PresencePruneMetrics};
pub use middleware::{
    auth_middleware, AuthExtractor, AuthMiddlewareState, OptionalAuth,
};
pub use openapi::ApiDoc;
pub use revalidate::{
    build_revalidator, BroadcastRevalidator, CompositeRevalidator, NoopRevalidator, Revalidator,
    StaleView, WebhookRevalidator,
};
pub use routes::create_api_router;
pub use services::{record_heartbeat, submit_review, sync_admin_role, PresenceTracker};
pub use state::AppState;
pub use types::*;
