use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Review;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub rating: i16,
    pub comment: Option<String>,
    pub product_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewQuery {
    pub product_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
pub struct ReviewList {
    pub items: Vec<Review>,
    /// Mean rating of the listed reviews, absent when there are none.
    pub average_rating: Option<f64>,
}
