use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::order_details::{CreateOrderDetailRequest, OrderDetailList, OrderDetailQuery},
    entity::{
        order_details::{ActiveModel, Column, Entity as OrderDetails},
        orders::Entity as Orders,
        products::{ActiveModel as ProductActive, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{OrderDetail, OrderStatus},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_order_details(
    state: &AppState,
    user: &AuthUser,
    query: OrderDetailQuery,
) -> AppResult<ApiResponse<OrderDetailList>> {
    ensure_admin(user)?;
    let items: Vec<OrderDetail> = OrderDetails::find()
        .filter(Column::OrderId.eq(query.order_id))
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderDetail::from)
        .collect();
    let meta = Meta::count(items.len());
    Ok(ApiResponse::success(
        "Order details",
        OrderDetailList { items },
        Some(meta),
    ))
}

/// Add a line to an open order, taking the quantity out of stock.
pub async fn create_order_detail(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderDetailRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_admin(user)?;
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".into(),
        ));
    }

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(payload.order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("order not found".into()))?;
    if OrderStatus::parse(&order.status)?.is_final() {
        return Err(AppError::BadRequest(format!(
            "order is {} and cannot take new lines",
            order.status
        )));
    }

    let product = Products::find_by_id(payload.product_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".into()))?;
    if product.stock < payload.quantity {
        return Err(AppError::BadRequest(format!(
            "insufficient stock for product {}",
            product.id
        )));
    }
    let price = payload.price.unwrap_or(product.price);
    if price <= 0 {
        return Err(AppError::BadRequest("price must be greater than 0".into()));
    }

    let now = Utc::now();
    let detail = ActiveModel {
        id: Set(Uuid::new_v4()),
        quantity: Set(payload.quantity),
        price: Set(price),
        order_id: Set(order.id),
        product_id: Set(product.id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let remaining = product.stock - payload.quantity;
    let mut product: ProductActive = product.into();
    product.stock = Set(remaining);
    product.updated_at = Set(now.into());
    product.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_detail_create",
        "order_details",
        serde_json::json!({ "order_id": detail.order_id, "product_id": detail.product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order detail created",
        detail.into(),
        Some(Meta::empty()),
    ))
}
