//! Bazaar Core - Marketplace Types and Policy
//!
//! Row shapes of the remote marketplace tables, strongly-typed identifiers,
//! the error taxonomy shared by every crate, and the single authorization
//! layer that precedes mutations. No I/O happens here.

pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod policy;
pub mod review;

pub use entities::*;
pub use enums::*;
pub use error::*;
pub use identity::*;
pub use policy::{check_any, require_admin, AdminAllowList, OwnershipRule, ORDER_BUYER, ORDER_SELLER};
pub use review::{average_rating, ReviewDraft, MAX_COMMENT_CHARS, MAX_RATING, MIN_RATING};
