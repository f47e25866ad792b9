use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Client;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ClientList {
    #[schema(value_type = Vec<Client>)]
    pub items: Vec<Client>,
}
