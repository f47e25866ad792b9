use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    dto::dashboard::{DashboardStats, StatusCount},
    entity::products::{Column as ProdCol, Entity as Products},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::{OrderStatus, Product},
    response::{ApiResponse, Meta},
    state::AppState,
};

const LOW_STOCK_PREVIEW: u64 = 10;

pub async fn stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(user)?;
    let threshold = state.config.low_stock_threshold;

    let (total_products, low_stock_products): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE stock < $1) FROM products",
    )
    .bind(threshold)
    .fetch_one(&state.pool)
    .await?;

    let (total_orders, total_revenue): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(total) FILTER (WHERE status <> $1), 0)::BIGINT
        FROM orders
        "#,
    )
    .bind(OrderStatus::Canceled.as_str())
    .fetch_one(&state.pool)
    .await?;

    let counts: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
            .fetch_all(&state.pool)
            .await?;
    let orders_by_status = OrderStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: status.as_str().to_string(),
            count: counts
                .iter()
                .find(|(s, _)| s == status.as_str())
                .map(|(_, c)| *c)
                .unwrap_or(0),
        })
        .collect();

    let low_stock = Products::find()
        .filter(ProdCol::Stock.lt(threshold))
        .order_by_asc(ProdCol::Stock)
        .order_by_asc(ProdCol::Name)
        .limit(LOW_STOCK_PREVIEW)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Dashboard",
        DashboardStats {
            total_products,
            total_orders,
            low_stock_products,
            total_revenue,
            orders_by_status,
            low_stock,
        },
        Some(Meta::empty()),
    ))
}
