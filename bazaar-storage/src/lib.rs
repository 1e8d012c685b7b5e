//! Bazaar Storage - Store Trait and Implementations
//!
//! Defines the store abstraction over the remote marketplace tables.
//! [`RestStore`] talks to the remote data service; [`InMemoryStore`] backs
//! tests and local runs.

pub mod memory;
pub mod query;
pub mod rest;
pub mod store;

pub use memory::InMemoryStore;
pub use query::TableQuery;
pub use rest::{RemoteConfig, RestClient, RestStore, UNIQUE_VIOLATION_CODE};
pub use store::{ListingQuery, MarketplaceStore, StoreFactory, StoreResult};
