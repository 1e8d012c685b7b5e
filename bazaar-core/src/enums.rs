//! Enum types for Bazaar entities
//!
//! The remote data service stores these as lowercase text columns, so every
//! enum serializes in `snake_case` and parses leniently from user input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ROLES
// ============================================================================

/// Role attribute of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary marketplace user
    #[default]
    User,
    /// Moderator with access to the admin surface
    Admin,
}

impl Role {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

// ============================================================================
// STATUSES
// ============================================================================

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Delivered,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

/// Visibility status of a catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Sold,
    Hidden,
}

impl ListingStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Sold => "sold",
            ListingStatus::Hidden => "hidden",
        }
    }
}

/// Moderation status of a game request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum GameRequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl GameRequestStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            GameRequestStatus::Pending => "pending",
            GameRequestStatus::Approved => "approved",
            GameRequestStatus::Rejected => "rejected",
        }
    }
}

/// Which side of an order a profile is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum OrderParty {
    Buyer,
    Seller,
}

impl OrderParty {
    /// Column of the `orders` table holding this party.
    pub fn column(&self) -> &'static str {
        match self {
            OrderParty::Buyer => "buyer_id",
            OrderParty::Seller => "seller_id",
        }
    }
}

/// Result of an admin role synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RoleSyncOutcome {
    /// Address not on the allow-list; nothing written
    NotEligible,
    /// Profile already had the admin role; nothing written
    AlreadyAdmin,
    /// Role overwritten to admin
    Promoted,
}

impl RoleSyncOutcome {
    /// True when the sync wrote to the profile.
    pub fn wrote(&self) -> bool {
        matches!(self, RoleSyncOutcome::Promoted)
    }
}

// ============================================================================
// ENTITY TYPE
// ============================================================================

/// Entity type discriminator, one per remote table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Profile,
    Listing,
    Order,
    Review,
    GameRequest,
    Category,
    ListingMedia,
}

impl EntityType {
    /// All entity types, in the order the diagnostics print them.
    pub const ALL: [EntityType; 7] = [
        EntityType::Profile,
        EntityType::Category,
        EntityType::Listing,
        EntityType::ListingMedia,
        EntityType::Order,
        EntityType::Review,
        EntityType::GameRequest,
    ];

    /// Name of the backing table in the remote data service.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityType::Profile => "profiles",
            EntityType::Listing => "listings",
            EntityType::Order => "orders",
            EntityType::Review => "reviews",
            EntityType::GameRequest => "game_requests",
            EntityType::Category => "categories",
            EntityType::ListingMedia => "listing_media",
        }
    }
}

// ============================================================================
// DISPLAY / PARSE
// ============================================================================

fn normalize_token(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Error returned when an enum value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for EnumParseError {}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for Role {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "user" | "member" => Ok(Role::User),
            "admin" | "administrator" => Ok(Role::Admin),
            _ => Err(EnumParseError {
                kind: "Role",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for OrderStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "delivered" => Ok(OrderStatus::Delivered),
            "completed" | "complete" => Ok(OrderStatus::Completed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            "refunded" => Ok(OrderStatus::Refunded),
            _ => Err(EnumParseError {
                kind: "OrderStatus",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl fmt::Display for GameRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for GameRequestStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "pending" | "open" => Ok(GameRequestStatus::Pending),
            "approved" => Ok(GameRequestStatus::Approved),
            "rejected" | "declined" => Ok(GameRequestStatus::Rejected),
            _ => Err(EnumParseError {
                kind: "GameRequestStatus",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for OrderParty {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "buyer" => Ok(OrderParty::Buyer),
            "seller" => Ok(OrderParty::Seller),
            _ => Err(EnumParseError {
                kind: "OrderParty",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}
