//! Service Layer
//!
//! Business logic behind the mutation endpoints. Services take the caller
//! as `Option<&AuthContext>` and decide what an anonymous call means before
//! any store is obtained.

mod presence;
mod review_service;
mod role_sync;

pub use presence::*;
pub use review_service::*;
pub use role_sync::*;
