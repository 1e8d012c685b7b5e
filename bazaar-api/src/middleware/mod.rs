//! Middleware modules for the Bazaar API
//!
//! - `auth`: bearer token verification and caller extraction
//!
//! # Middleware Order
//!
//! ```ignore
//! Router::new()
//!     .route("/api/v1/resource", post(handler))
//!     .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
//!     // Outermost: request spans
//!     .layer(TraceLayer::new_for_http())
//! ```

mod auth;

pub use auth::{
    auth_middleware, AuthExtractor, AuthMiddlewareError,
    AuthMiddlewareState, OptionalAuth,
};
