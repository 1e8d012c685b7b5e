//! Error types for Bazaar operations

use crate::EntityType;
use thiserror::Error;
use uuid::Uuid;

/// Remote data service errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Unique constraint violated on {entity_type}: {reason}")]
    UniqueViolation { entity_type: EntityType, reason: String },

    #[error("Remote request to {table} failed with status {status}: {message}")]
    Remote {
        table: String,
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Remote service unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Remote request timed out: {reason}")]
    Timeout { reason: String },

    #[error("Failed to decode {table} rows: {reason}")]
    Decode { table: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Authorization policy errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Subject {subject} does not own {resource} via {field}")]
    NotOwner {
        resource: &'static str,
        field: &'static str,
        subject: Uuid,
    },

    #[error("Role {required} required")]
    RoleRequired { required: &'static str },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Value for {field} out of range: {value} not in {min}..={max}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Bazaar errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BazaarError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for Bazaar operations.
pub type BazaarResult<T> = Result<T, BazaarError>;

impl StoreError {
    /// True for failures of the remote service itself rather than the request.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. } | StoreError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_names_table() {
        let err = StoreError::NotFound {
            entity_type: EntityType::Order,
            id: Uuid::nil(),
        };
        assert!(err.to_string().contains("orders"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Timeout { reason: "t".into() }.is_transient());
        assert!(!StoreError::LockPoisoned.is_transient());
    }

    #[test]
    fn test_bazaar_error_from_policy() {
        let err: BazaarError = PolicyError::Unauthenticated.into();
        assert!(matches!(err, BazaarError::Policy(PolicyError::Unauthenticated)));
    }
}
