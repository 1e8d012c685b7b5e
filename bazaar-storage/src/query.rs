//! Query-string builder for the remote REST surface.
//!
//! Produces `/rest/v1/<table>` plus `select`, `col=op.value`, `order`,
//! `limit` and `offset` parameters.

use bazaar_core::EntityType;
use std::fmt::Display;

/// Embedded columns for catalog reads.
pub const LISTING_SELECT: &str =
    "*,category:categories(id,name,slug),media:listing_media(id,listing_id,url,position)";

/// Same as [`LISTING_SELECT`], but an inner join so a category filter drops
/// listings outside it.
pub const LISTING_SELECT_BY_CATEGORY: &str =
    "*,category:categories!inner(id,name,slug),media:listing_media(id,listing_id,url,position)";

/// Game requests with the requester's profile embedded.
pub const GAME_REQUEST_SELECT: &str = "*,requester:profiles(id,email,display_name,role)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    entity: EntityType,
    select: String,
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl TableQuery {
    pub fn new(entity: EntityType) -> Self {
        Self {
            entity,
            select: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
            offset: None,
        }
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    pub fn table(&self) -> &'static str {
        self.entity.table_name()
    }

    /// Path relative to the service root.
    pub fn path(&self) -> String {
        format!("/rest/v1/{}", self.table())
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = columns.to_string();
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn filter(mut self, column: &str, op: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("{op}.{value}")));
        self
    }

    /// `or=(a.eq.x,b.eq.y)`
    pub fn or_eq(mut self, clauses: &[(&str, String)]) -> Self {
        let inner = clauses
            .iter()
            .map(|(col, value)| format!("{col}.eq.{value}"))
            .collect::<Vec<_>>()
            .join(",");
        self.filters.push(("or".to_string(), format!("({inner})")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.order = Some(format!("{column}.{dir}"));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Query parameters in insertion order.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 4);
        params.push(("select".to_string(), self.select.clone()));
        params.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        params
    }

    /// Filters only, for PATCH requests where `select` is ignored.
    pub fn filter_params(&self) -> &[(String, String)] {
        &self.filters
    }
}

/// Total from a `Content-Range` header such as `0-9/42` or `*/0`.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}
