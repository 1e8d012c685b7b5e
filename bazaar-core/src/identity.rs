//! Identity types for Bazaar entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Common behavior of the strongly-typed entity identifiers.
///
/// Every table row in the remote data service is keyed by a UUID. Wrapping
/// the UUID per entity keeps an `OrderId` from being passed where a
/// `ProfileId` is expected.
pub trait EntityIdType:
    Copy + Eq + std::hash::Hash + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static
{
    /// Human-readable entity name used in error messages.
    const ENTITY_NAME: &'static str;

    /// Wrap an existing UUID.
    fn new(uuid: Uuid) -> Self;

    /// The underlying UUID.
    fn as_uuid(&self) -> Uuid;

    /// Generate a fresh, timestamp-sortable identifier.
    fn now_v7() -> Self {
        Self::new(Uuid::now_v7())
    }

    /// The nil identifier.
    fn nil() -> Self {
        Self::new(Uuid::nil())
    }
}

/// Defines a `Uuid` newtype implementing [`EntityIdType`].
#[macro_export]
macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $crate::identity::EntityIdType for $name {
            const ENTITY_NAME: &'static str = $entity;

            fn new(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_entity_id!(
    /// Identifier of a user profile (same value as the auth user id).
    ProfileId,
    "profile"
);
define_entity_id!(
    /// Identifier of a marketplace listing.
    ListingId,
    "listing"
);
define_entity_id!(
    /// Identifier of a buyer/seller order.
    OrderId,
    "order"
);
define_entity_id!(
    /// Identifier of a review.
    ReviewId,
    "review"
);
define_entity_id!(
    /// Identifier of a listing category.
    CategoryId,
    "category"
);
define_entity_id!(
    /// Identifier of a listing media item.
    MediaId,
    "listing media"
);
define_entity_id!(
    /// Identifier of a user-submitted game request.
    GameRequestId,
    "game request"
);
