use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{
        CreateOrderRequest, OrderHistory, OrderHistoryEntry, OrderHistoryLine, OrderList,
        OrderWithDetails, UpdateOrderRequest,
    },
    entity::{
        bills::Entity as Bills,
        clients::Entity as Clients,
        order_details::{Column as DetailCol, Entity as OrderDetails},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Bill, Client, DeliveryMethod, Order, OrderDetail, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::client_service,
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }
    if let Some(client_id) = query.client_id {
        condition = condition.add(OrderCol::ClientId.eq(client_id));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithDetails>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let details = OrderDetails::find()
        .filter(DetailCol::OrderId.eq(order.id))
        .order_by_asc(DetailCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderDetail::from)
        .collect();

    Ok(ApiResponse::success(
        "Order found",
        OrderWithDetails {
            order: Order::try_from(order)?,
            details,
        },
        Some(Meta::empty()),
    ))
}

/// Manual order entry from the admin panel; the bill and client must exist.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    if payload.total < 0 {
        return Err(AppError::BadRequest("total cannot be negative".into()));
    }
    let delivery_method = match payload.delivery_method {
        Some(code) => DeliveryMethod::try_from(code)?,
        None => DeliveryMethod::default(),
    };
    if Clients::find_by_id(payload.client_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest("client not found".into()));
    }
    if Bills::find_by_id(payload.bill_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest("bill not found".into()));
    }
    let billed = Orders::find()
        .filter(OrderCol::BillId.eq(payload.bill_id))
        .one(&state.orm)
        .await?;
    if billed.is_some() {
        return Err(AppError::Conflict("bill already belongs to an order".into()));
    }

    let now = Utc::now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        date: Set(now.into()),
        total: Set(payload.total),
        delivery_method: Set(delivery_method.code()),
        status: Set(payload
            .status
            .unwrap_or(OrderStatus::Pending)
            .as_str()
            .to_string()),
        client_id: Set(payload.client_id),
        bill_id: Set(payload.bill_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        Order::try_from(order)?,
        Some(Meta::empty()),
    ))
}

/// Update status and/or delivery method. Canceling an order puts its
/// quantities back into stock within the same transaction.
pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    if payload.status.is_none() && payload.delivery_method.is_none() {
        return Err(AppError::BadRequest("nothing to update".into()));
    }
    let delivery_method = payload
        .delivery_method
        .map(DeliveryMethod::try_from)
        .transpose()?;

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let current = OrderStatus::parse(&existing.status)?;

    let mut active: OrderActive = existing.into();
    if let Some(next) = payload.status {
        validate_transition(current, next)?;
        if next == OrderStatus::Canceled && current != OrderStatus::Canceled {
            let details = OrderDetails::find()
                .filter(DetailCol::OrderId.eq(id))
                .all(&txn)
                .await?;
            for detail in details {
                Products::update_many()
                    .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).add(detail.quantity))
                    .col_expr(ProdCol::UpdatedAt, Expr::value(Utc::now()))
                    .filter(ProdCol::Id.eq(detail.product_id))
                    .exec(&txn)
                    .await?;
            }
        }
        active.status = Set(next.as_str().to_string());
    }
    if let Some(method) = delivery_method {
        if current.is_final() {
            return Err(AppError::BadRequest(format!(
                "order is {} and can no longer change delivery",
                current.as_str()
            )));
        }
        active.delivery_method = Set(method.code());
    }
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        Order::try_from(order)?,
        Some(Meta::empty()),
    ))
}

/// Delivered and canceled orders are closed; re-applying the current
/// status is a no-op.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> AppResult<()> {
    if from == to {
        return Ok(());
    }
    if from.is_final() {
        return Err(AppError::BadRequest(format!(
            "order is {} and can no longer change status",
            from.as_str()
        )));
    }
    Ok(())
}

/// Storefront "my orders": everything a client placed, newest first.
pub async fn order_history(state: &AppState, email: &str) -> AppResult<ApiResponse<OrderHistory>> {
    let email = client_service::normalize_email(email)?;
    let client = client_service::find_by_email(&state.orm, &email)
        .await?
        .ok_or(AppError::NotFound)?;

    let orders = Orders::find()
        .filter(OrderCol::ClientId.eq(client.id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let bill_ids: Vec<Uuid> = orders.iter().map(|o| o.bill_id).collect();

    let details = OrderDetails::find()
        .filter(DetailCol::OrderId.is_in(order_ids))
        .find_also_related(Products)
        .all(&state.orm)
        .await?;
    let mut lines_by_order: HashMap<Uuid, Vec<OrderHistoryLine>> = HashMap::new();
    for (detail, product) in details {
        lines_by_order
            .entry(detail.order_id)
            .or_default()
            .push(OrderHistoryLine {
                product_id: detail.product_id,
                product_name: product.map(|p| p.name).unwrap_or_default(),
                quantity: detail.quantity,
                price: detail.price,
            });
    }

    let mut bills: HashMap<Uuid, Bill> = HashMap::new();
    for bill in Bills::find()
        .filter(crate::entity::bills::Column::Id.is_in(bill_ids))
        .all(&state.orm)
        .await?
    {
        bills.insert(bill.id, Bill::try_from(bill)?);
    }

    let mut entries = Vec::with_capacity(orders.len());
    for order in orders {
        let lines = lines_by_order.remove(&order.id).unwrap_or_default();
        let bill = bills.remove(&order.bill_id);
        entries.push(OrderHistoryEntry {
            order: Order::try_from(order)?,
            bill,
            lines,
        });
    }

    let meta = Meta::count(entries.len());
    Ok(ApiResponse::success(
        "Order history",
        OrderHistory {
            client: Client::from(client),
            orders: entries,
        },
        Some(meta),
    ))
}
