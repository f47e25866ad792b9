pub mod address_service;
pub mod auth_service;
pub mod bill_service;
pub mod cart_service;
pub mod category_service;
pub mod checkout_service;
pub mod client_service;
pub mod dashboard_service;
pub mod order_detail_service;
pub mod order_service;
pub mod product_service;
pub mod review_service;

/// Trimmed, non-empty text or a validation error naming the field.
pub(crate) fn required(field: &str, value: &str) -> crate::error::AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(crate::error::AppError::BadRequest(format!(
            "{field} must not be empty"
        )));
    }
    Ok(value.to_string())
}
