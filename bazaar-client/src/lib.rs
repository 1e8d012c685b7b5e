//! Bazaar client library.
//!
//! Session-side effects of the marketplace frontend: the presence heartbeat
//! and the one-off admin role sync, over the Bazaar HTTP API.

pub mod api_client;
pub mod config;
pub mod error;
pub mod presence;
pub mod session;

pub use api_client::ApiClient;
pub use config::{BazaarClientConfig, ConfigError};
pub use error::{ClientError, ClientResult};
pub use presence::{
    PresenceConfig, PresenceHandle, PresenceHeartbeat, PresenceSink, PresenceSnapshot, Visibility,
};
pub use session::ClientSession;
