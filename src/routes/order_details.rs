use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::order_details::{CreateOrderDetailRequest, OrderDetailList, OrderDetailQuery},
    error::AppResult,
    middleware::auth::AuthUser,
    models::OrderDetail,
    response::ApiResponse,
    services::order_detail_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_order_details).post(create_order_detail))
}

#[utoipa::path(
    get,
    path = "/api/order_details",
    params(("order_id" = uuid::Uuid, Query, description = "Order ID")),
    responses(
        (status = 200, description = "Details of an order", body = ApiResponse<OrderDetailList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_order_details(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderDetailQuery>,
) -> AppResult<Json<ApiResponse<OrderDetailList>>> {
    Ok(Json(
        order_detail_service::list_order_details(&state, &user, query).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/order_details",
    request_body = CreateOrderDetailRequest,
    responses(
        (status = 201, description = "Add a line to an order", body = ApiResponse<OrderDetail>),
        (status = 400, description = "Insufficient stock or closed order")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order_detail(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderDetailRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderDetail>>)> {
    let resp = order_detail_service::create_order_detail(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
