//! API Request and Response Types
//!
//! Row shapes come from `bazaar-core`; this module only adds the envelopes
//! and query parameters of the HTTP surface.

mod admin;
mod catalog;
mod order;
mod presence;
mod review;

pub use admin::*;
pub use catalog::*;
pub use order::*;
pub use presence::*;
pub use review::*;
