//! Order-related API types

use bazaar_core::{Order, OrderParty};
use serde::{Deserialize, Serialize};

/// Query parameters of the caller's order list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListOrdersParams {
    /// Restrict to orders where the caller is the buyer or the seller
    pub role: Option<OrderParty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListOrdersResponse {
    pub orders: Vec<Order>,
    pub total: usize,
}

impl From<Vec<Order>> for ListOrdersResponse {
    fn from(orders: Vec<Order>) -> Self {
        Self {
            total: orders.len(),
            orders,
        }
    }
}
