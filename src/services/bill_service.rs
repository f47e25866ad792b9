use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::bills::{BillList, BillQuery, CreateBillRequest},
    entity::{
        bills::{ActiveModel, Column, Entity as Bills, Model as BillModel},
        orders::Entity as Orders,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Bill, PaymentType},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_bills(
    state: &AppState,
    user: &AuthUser,
    query: BillQuery,
) -> AppResult<ApiResponse<BillList>> {
    ensure_admin(user)?;
    let models = match query.order_id {
        Some(order_id) => {
            let order = Orders::find_by_id(order_id)
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound)?;
            Bills::find_by_id(order.bill_id)
                .all(&state.orm)
                .await?
        }
        None => {
            Bills::find()
                .order_by_desc(Column::CreatedAt)
                .all(&state.orm)
                .await?
        }
    };
    let items = models
        .into_iter()
        .map(Bill::try_from)
        .collect::<AppResult<Vec<_>>>()?;
    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Bills", BillList { items }, Some(meta)))
}

pub async fn get_bill(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Bill>> {
    ensure_admin(user)?;
    let bill = Bills::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Bill", Bill::try_from(bill)?, None))
}

pub async fn create_bill(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBillRequest,
) -> AppResult<ApiResponse<Bill>> {
    ensure_admin(user)?;
    if payload.total < 0 {
        return Err(AppError::BadRequest("total cannot be negative".into()));
    }
    if payload.discount < 0 {
        return Err(AppError::BadRequest("discount cannot be negative".into()));
    }
    let bill_number = match payload.bill_number.as_deref().map(str::trim) {
        Some(number) if !number.is_empty() => {
            let taken = Bills::find()
                .filter(Column::BillNumber.eq(number))
                .one(&state.orm)
                .await?;
            if taken.is_some() {
                return Err(AppError::Conflict(format!(
                    "bill number {number} already exists"
                )));
            }
            number.to_string()
        }
        _ => build_bill_number(Uuid::new_v4()),
    };

    let bill = insert(
        &state.orm,
        bill_number,
        payload.discount,
        payload.total,
        payload.payment_type,
    )
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "bill_create",
        "bills",
        serde_json::json!({ "bill_id": bill.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Bill created",
        Bill::try_from(bill)?,
        Some(Meta::empty()),
    ))
}

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    bill_number: String,
    discount: i64,
    total: i64,
    payment_type: PaymentType,
) -> AppResult<BillModel> {
    let now = Utc::now();
    let bill = ActiveModel {
        id: Set(Uuid::new_v4()),
        bill_number: Set(bill_number),
        discount: Set(discount),
        total: Set(total),
        payment_type: Set(payment_type.as_str().to_string()),
        date: Set(now.date_naive()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(conn)
    .await?;
    Ok(bill)
}

/// `BILL-<timestamp>-<first 8 hex of a uuid>`.
pub fn build_bill_number(seed: Uuid) -> String {
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    let suffix = seed.simple().to_string();
    format!("BILL-{}-{}", stamp, &suffix[..8].to_uppercase())
}
