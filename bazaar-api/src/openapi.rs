//! OpenAPI Specification for the Bazaar API
//!
//! Generated with utoipa from the route annotations and the schema derives
//! on the row and DTO types.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{admin, health, listings, orders, profile, sellers};
use crate::types::*;

use bazaar_core::{
    Category, GameRequest, GameRequestStatus, Listing, ListingDetail, ListingMedia, ListingStatus,
    Order, OrderParty, OrderStatus, Profile, ProfileSummary, Review, Role, RoleSyncOutcome,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bazaar API",
        version = "0.3.0",
        description = "Marketplace backend: listings, orders, reviews and admin moderation",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "Bazaar", url = "https://bazaar.market")
    ),
    servers(
        (url = "https://api.bazaar.market", description = "Production"),
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Orders", description = "Orders of the caller"),
        (name = "Reviews", description = "Order reviews and seller ratings"),
        (name = "Catalog", description = "Listings and categories"),
        (name = "Admin", description = "Role sync and moderation"),
        (name = "Profile", description = "Caller profile and presence"),
        (name = "Health", description = "Liveness and readiness"),
    ),
    paths(
        orders::list_orders,
        orders::get_order,
        orders::submit_review,
        listings::list_listings,
        listings::get_listing,
        listings::list_categories,
        sellers::list_seller_reviews,
        admin::role_sync,
        admin::list_game_requests,
        profile::get_me,
        profile::heartbeat,
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            ApiError,
            ErrorCode,
            // Rows
            Profile,
            ProfileSummary,
            Order,
            Review,
            GameRequest,
            Category,
            Listing,
            ListingDetail,
            ListingMedia,
            // Enums
            Role,
            OrderStatus,
            OrderParty,
            ListingStatus,
            GameRequestStatus,
            RoleSyncOutcome,
            // Requests / responses
            SubmitReviewRequest,
            SellerReviewsResponse,
            ListOrdersResponse,
            ListListingsResponse,
            ListCategoriesResponse,
            ListGameRequestsResponse,
            RoleSyncResponse,
            BeatReason,
            HeartbeatResponse,
            HealthResponse,
            HealthStatus,
            HealthDetails,
            ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security scheme modifier for OpenAPI document.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token issued by the remote auth service"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
