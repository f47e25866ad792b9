use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::bills::{BillList, BillQuery, CreateBillRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Bill,
    response::ApiResponse,
    services::bill_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bills).post(create_bill))
        .route("/{id}", get(get_bill))
}

#[utoipa::path(
    get,
    path = "/api/bills",
    params(("order_id" = Option<Uuid>, Query, description = "Bill of a given order")),
    responses(
        (status = 200, description = "List bills", body = ApiResponse<BillList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn list_bills(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BillQuery>,
) -> AppResult<Json<ApiResponse<BillList>>> {
    Ok(Json(bill_service::list_bills(&state, &user, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/bills/{id}",
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Get bill", body = ApiResponse<Bill>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn get_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Bill>>> {
    Ok(Json(bill_service::get_bill(&state, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/bills",
    request_body = CreateBillRequest,
    responses(
        (status = 201, description = "Create bill", body = ApiResponse<Bill>),
        (status = 409, description = "Bill number taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn create_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBillRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Bill>>)> {
    let resp = bill_service::create_bill(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
