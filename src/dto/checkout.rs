use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    cart::CheckoutTotals,
    models::{Address, Bill, Client, PaymentType},
    dto::orders::OrderWithDetails,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub number: String,
    pub city: String,
    /// 1 = drive thru, 2 = on hand, 3 = home delivery (default).
    pub delivery_method: Option<i32>,
    pub payment_type: Option<PaymentType>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub client: Client,
    pub address: Address,
    pub bill: Bill,
    #[serde(flatten)]
    pub order: OrderWithDetails,
    pub totals: CheckoutTotals,
    /// Where the storefront sends the customer after a successful checkout.
    pub order_history_url: String,
}
