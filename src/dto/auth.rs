use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// New back-office account. Only admins can create them.
#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    /// At least 8 characters.
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// `Bearer <jwt>`, ready for the Authorization header.
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
    pub role: String,
}

/// JWT payload; `sub` is the user id.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
