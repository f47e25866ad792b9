use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::OrderDetail;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderDetailRequest {
    pub quantity: i32,
    /// Defaults to the product's current price.
    pub price: Option<i64>,
    pub order_id: Uuid,
    pub product_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderDetailQuery {
    pub order_id: Uuid,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderDetailList {
    #[schema(value_type = Vec<OrderDetail>)]
    pub items: Vec<OrderDetail>,
}
