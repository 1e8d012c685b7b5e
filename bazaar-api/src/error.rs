//! Error Types for the Bazaar API
//!
//! This module defines error handling for the API layer:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//! - Conversions from the core error taxonomy
//!
//! All errors are serialized as JSON `{ code, message, details? }` with the
//! HTTP status of their code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bazaar_core::{
    BazaarError, ConfigError, EntityType, PolicyError, StoreError, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401, 403)
    // ========================================================================
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Request is authenticated but lacks permission for the resource
    Forbidden,

    /// Authentication token is invalid or malformed
    InvalidToken,

    /// Authentication token has expired
    TokenExpired,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    ValidationFailed,
    InvalidInput,
    MissingField,
    InvalidRange,
    InvalidFormat,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    EntityNotFound,
    OrderNotFound,
    ProfileNotFound,
    ListingNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// The order already has a review
    ReviewAlreadyExists,

    /// Operation conflicts with current state
    StateConflict,

    // ========================================================================
    // Server Errors (500, 503, 504)
    // ========================================================================
    InternalError,

    /// Remote data service rejected or failed the operation
    DatabaseError,

    ServiceUnavailable,

    Timeout,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidToken | ErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            ErrorCode::Forbidden => StatusCode::FORBIDDEN,

            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidRange
            | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,

            ErrorCode::EntityNotFound
            | ErrorCode::OrderNotFound
            | ErrorCode::ProfileNotFound
            | ErrorCode::ListingNotFound => StatusCode::NOT_FOUND,

            ErrorCode::ReviewAlreadyExists | ErrorCode::StateConflict => StatusCode::CONFLICT,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,

            ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::Forbidden => "Access forbidden",
            ErrorCode::InvalidToken => "Invalid authentication token",
            ErrorCode::TokenExpired => "Authentication token has expired",

            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidRange => "Value is out of valid range",
            ErrorCode::InvalidFormat => "Invalid format",

            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::ProfileNotFound => "Profile not found",
            ErrorCode::ListingNotFound => "Listing not found",

            ErrorCode::ReviewAlreadyExists => "This order has already been reviewed",
            ErrorCode::StateConflict => "Operation conflicts with current state",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::Timeout => "Operation timed out",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn invalid_range(field: &str, min: impl fmt::Display, max: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidRange,
            format!("Field '{}' must be between {} and {}", field, min, max),
        )
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    pub fn entity_not_found(entity_type: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityNotFound,
            format!("{} with id {} not found", entity_type, id),
        )
    }

    pub fn order_not_found(order_id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::OrderNotFound, format!("Order {} not found", order_id))
    }

    pub fn profile_not_found(profile_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ProfileNotFound,
            format!("Profile {} not found", profile_id),
        )
    }

    pub fn listing_not_found(listing_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ListingNotFound,
            format!("Listing {} not found", listing_id),
        )
    }

    pub fn review_already_exists(order_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ReviewAlreadyExists,
            format!("Order {} has already been reviewed", order_id),
        )
    }

    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StateConflict, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn timeout(operation: &str) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!("Operation '{}' timed out", operation),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM CORE ERRORS
// ============================================================================

/// Remote failures are logged in full and surfaced without internals.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity_type, id } => match entity_type {
                EntityType::Order => ApiError::order_not_found(id),
                EntityType::Profile => ApiError::profile_not_found(id),
                EntityType::Listing => ApiError::listing_not_found(id),
                other => ApiError::entity_not_found(other.table_name(), id),
            },
            StoreError::UniqueViolation {
                entity_type: EntityType::Review,
                ..
            } => ApiError::from_code(ErrorCode::ReviewAlreadyExists),
            StoreError::UniqueViolation { entity_type, reason } => {
                tracing::warn!(entity_type = %entity_type, reason = %reason, "Unique constraint violated");
                ApiError::state_conflict(format!("{} already exists", entity_type.table_name()))
            }
            StoreError::Unavailable { reason } => {
                tracing::error!(reason = %reason, "Remote data service unavailable");
                ApiError::from_code(ErrorCode::ServiceUnavailable)
            }
            StoreError::Timeout { reason } => {
                tracing::error!(reason = %reason, "Remote data service timed out");
                ApiError::timeout("remote query")
            }
            err @ (StoreError::Remote { .. } | StoreError::Decode { .. }) => {
                tracing::error!(error = %err, "Remote data service error");
                ApiError::database_error("Database operation failed")
            }
            StoreError::LockPoisoned => {
                tracing::error!("Store lock poisoned");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Unauthenticated => ApiError::from_code(ErrorCode::Unauthorized),
            PolicyError::NotOwner { resource, field, .. } => {
                ApiError::forbidden(format!("Only the {} of this {} may do this", field_role(field), resource))
            }
            PolicyError::RoleRequired { required } => {
                ApiError::forbidden(format!("Role '{}' required", required))
            }
        }
    }
}

fn field_role(field: &str) -> &str {
    field.strip_suffix("_id").unwrap_or(field)
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(&field),
            ValidationError::InvalidValue { field, reason } => {
                ApiError::invalid_input(format!("Invalid {}: {}", field, reason))
            }
            ValidationError::OutOfRange { field, min, max, .. } => {
                ApiError::invalid_range(&field, min, max)
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!(error = %err, "Configuration error");
        ApiError::internal_error("Server configuration error")
    }
}

impl From<BazaarError> for ApiError {
    fn from(err: BazaarError) -> Self {
        match err {
            BazaarError::Store(e) => e.into(),
            BazaarError::Policy(e) => e.into(),
            BazaarError::Validation(e) => e.into(),
            BazaarError::Config(e) => e.into(),
        }
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
