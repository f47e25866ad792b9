use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Bill, PaymentType};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBillRequest {
    /// Generated when omitted.
    pub bill_number: Option<String>,
    #[serde(default)]
    pub discount: i64,
    pub total: i64,
    pub payment_type: PaymentType,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BillQuery {
    pub order_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct BillList {
    #[schema(value_type = Vec<Bill>)]
    pub items: Vec<Bill>,
}
