//! Constants for the Bazaar API

// ============================================================================
// AUTHENTICATION
// ============================================================================

/// Lifetime of locally minted tokens (1 hour)
pub const DEFAULT_JWT_EXPIRATION_SECS: i64 = 3600;

/// Default clock skew tolerance
pub const DEFAULT_JWT_CLOCK_SKEW_SECS: i64 = 60;

/// Minimum required length for JWT secret keys
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Placeholder secret used when none is configured
pub const INSECURE_DEFAULT_JWT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// PRESENCE
// ============================================================================

/// Heartbeats from one user closer together than this are coalesced
pub const DEFAULT_PRESENCE_COALESCE_SECS: u64 = 15;

/// How often stale coalescing entries are pruned
pub const PRESENCE_PRUNE_INTERVAL_SECS: u64 = 300;

// ============================================================================
// REVALIDATION
// ============================================================================

/// Capacity of the stale-view broadcast channel
pub const DEFAULT_REVALIDATE_CHANNEL_CAPACITY: usize = 256;

/// Timeout for one revalidation webhook call
pub const DEFAULT_REVALIDATE_TIMEOUT_SECS: u64 = 5;

/// Header carrying the shared secret on revalidation webhooks
pub const REVALIDATE_SECRET_HEADER: &str = "x-revalidate-secret";

/// Header carrying the HMAC-SHA256 of the webhook body
pub const REVALIDATE_SIGNATURE_HEADER: &str = "x-revalidate-signature";

// ============================================================================
// PAGINATION
// ============================================================================

/// Default page size for list operations
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Maximum page size for list operations
pub const MAX_PAGE_SIZE: u32 = 200;
