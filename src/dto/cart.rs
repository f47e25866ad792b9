use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::{CartLine, CheckoutTotals};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuantityStep {
    Increment,
    Decrement,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StepQuantityRequest {
    pub step: QuantityStep,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub id: Uuid,
    pub items: Vec<CartLineView>,
    pub item_count: i64,
    pub totals: CheckoutTotals,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub line_total: i64,
}
