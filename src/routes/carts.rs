use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        cart::{AddToCartRequest, CartView, SetQuantityRequest, StepQuantityRequest},
        checkout::{CheckoutRequest, CheckoutResponse},
    },
    error::AppResult,
    response::ApiResponse,
    services::{cart_service, checkout_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_cart))
        .route("/{id}", get(get_cart).delete(clear_cart))
        .route("/{id}/items", post(add_item))
        .route(
            "/{id}/items/{product_id}",
            put(set_quantity).patch(step_quantity).delete(remove_item),
        )
        .route("/{id}/checkout", post(checkout))
}

#[utoipa::path(
    post,
    path = "/api/carts",
    responses(
        (status = 201, description = "Create an empty guest cart", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn create_cart(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<ApiResponse<CartView>>)> {
    let resp = cart_service::create_cart(&state).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/carts/{id}",
    params(("id" = Uuid, Path, description = "Cart ID")),
    responses(
        (status = 200, description = "Cart lines and totals", body = ApiResponse<CartView>),
        (status = 404, description = "Cart not found")
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::get_cart(&state, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{id}",
    params(("id" = Uuid, Path, description = "Cart ID")),
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartView>),
        (status = 404, description = "Cart not found")
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::clear_cart(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/carts/{id}/items",
    params(("id" = Uuid, Path, description = "Cart ID")),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add units of a product, clamped to stock", body = ApiResponse<CartView>),
        (status = 400, description = "Unknown or out-of-stock product"),
    ),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::add_item(&state, id, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/carts/{id}/items/{product_id}",
    params(
        ("id" = Uuid, Path, description = "Cart ID"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Quantity set, clamped to [1, stock]", body = ApiResponse<CartView>),
        (status = 404, description = "Line not found")
    ),
    tag = "Cart"
)]
pub async fn set_quantity(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SetQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(
        cart_service::set_quantity(&state, id, product_id, payload).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/carts/{id}/items/{product_id}",
    params(
        ("id" = Uuid, Path, description = "Cart ID"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = StepQuantityRequest,
    responses(
        (status = 200, description = "Quantity moved by one", body = ApiResponse<CartView>),
        (status = 404, description = "Line not found")
    ),
    tag = "Cart"
)]
pub async fn step_quantity(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<StepQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(
        cart_service::step_quantity(&state, id, product_id, payload.step).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{id}/items/{product_id}",
    params(
        ("id" = Uuid, Path, description = "Cart ID"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Line removed", body = ApiResponse<CartView>),
        (status = 404, description = "Line not found"),
    ),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::remove_item(&state, id, product_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/carts/{id}/checkout",
    params(("id" = Uuid, Path, description = "Cart ID")),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed; the cart is consumed", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Invalid contact data, empty cart or insufficient stock"),
        (status = 404, description = "Cart not found")
    ),
    tag = "Checkout"
)]
pub async fn checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CheckoutResponse>>)> {
    let resp = checkout_service::checkout(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
