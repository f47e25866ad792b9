use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Product;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub low_stock_products: i64,
    /// Sum of totals of orders that were not canceled.
    pub total_revenue: i64,
    pub orders_by_status: Vec<StatusCount>,
    pub low_stock: Vec<Product>,
}
