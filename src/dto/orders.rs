use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Bill, Client, Order, OrderDetail, OrderStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub total: i64,
    pub delivery_method: Option<i32>,
    pub status: Option<OrderStatus>,
    pub client_id: Uuid,
    pub bill_id: Uuid,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub delivery_method: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithDetails {
    pub order: Order,
    pub details: Vec<OrderDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

/// Order line as shown in a customer's order history.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderHistoryLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderHistoryEntry {
    pub order: Order,
    pub bill: Option<Bill>,
    pub lines: Vec<OrderHistoryLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderHistory {
    pub client: Client,
    pub orders: Vec<OrderHistoryEntry>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderHistoryQuery {
    pub email: String,
}
