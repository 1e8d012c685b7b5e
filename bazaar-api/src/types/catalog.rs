//! Catalog API types

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use bazaar_core::{Category, ListingDetail};
use bazaar_storage::ListingQuery;
use serde::{Deserialize, Serialize};

/// Query parameters of the listing catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListListingsParams {
    /// Category slug
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListListingsParams {
    /// Active listings, page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn to_query(&self) -> ListingQuery {
        ListingQuery {
            category_slug: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.unwrap_or(0),
            ..ListingQuery::active()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListListingsResponse {
    pub listings: Vec<ListingDetail>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListCategoriesResponse {
    pub categories: Vec<Category>,
}
