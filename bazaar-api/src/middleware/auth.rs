//! Axum Middleware for Authentication
//!
//! This module provides Axum middleware that:
//! - Reads `Authorization: Bearer <token>`
//! - Verifies the token locally (see [`crate::auth`])
//! - Injects AuthContext into request extensions
//! - Returns 401 for missing or invalid credentials

use crate::auth::{authenticate, AuthConfig, AuthContext};
use crate::error::ApiError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

/// Shared state for authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthMiddlewareState {
    pub auth_config: Arc<AuthConfig>,
}

impl AuthMiddlewareState {
    pub fn new(auth_config: Arc<AuthConfig>) -> Self {
        Self { auth_config }
    }
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Axum middleware for authentication.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware};
/// use bazaar_api::middleware::{auth_middleware, AuthMiddlewareState};
///
/// let auth_state = AuthMiddlewareState::new(Arc::new(AuthConfig::from_env()));
///
/// let app = Router::new()
///     .route("/api/v1/me", axum::routing::get(|| async { "OK" }))
///     .layer(middleware::from_fn_with_state(auth_state, auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthMiddlewareError> {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            AuthMiddlewareError(ApiError::unauthorized(
                "Authentication required: provide an Authorization header",
            ))
        })?;

    let auth_context = authenticate(&state.auth_config, auth_header).map_err(|e| {
        tracing::debug!(code = %e.code, "Rejected bearer token");
        AuthMiddlewareError(e)
    })?;

    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Error wrapper for middleware that implements IntoResponse.
#[derive(Debug)]
pub struct AuthMiddlewareError(pub ApiError);

impl IntoResponse for AuthMiddlewareError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

// ============================================================================
// TYPED EXTRACTORS
// ============================================================================

/// Typed Axum extractor for the authenticated caller.
///
/// ```rust,no_run
/// use axum::Json;
/// use bazaar_api::middleware::AuthExtractor;
///
/// async fn whoami(AuthExtractor(auth): AuthExtractor) -> Json<String> {
///     Json(auth.user_id.to_string())
/// }
/// ```
///
/// Without `auth_middleware` on the route the extractor rejects with 401.
#[derive(Debug, Clone)]
pub struct AuthExtractor(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthExtractor
where
    S: Send + Sync,
{
    type Rejection = AuthMiddlewareError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthExtractor)
            .ok_or_else(|| AuthMiddlewareError(ApiError::unauthorized("Authentication required")))
    }
}

impl std::ops::Deref for AuthExtractor {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extractor yielding the caller when one was authenticated, `None` otherwise.
///
/// Used by actions that must themselves decide what an anonymous call means.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthContext>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<AuthContext>().cloned()))
    }
}
