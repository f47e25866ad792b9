use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use sqlx::{FromRow, PgConnection, PgExecutor};
use uuid::Uuid;

use crate::{
    audit,
    cart::{Cart, CartLine, CheckoutTotals, ProductSnapshot},
    dto::cart::{AddToCartRequest, CartLineView, CartView, QuantityStep, SetQuantityRequest},
    entity::{
        carts::{ActiveModel as CartActive, Entity as Carts},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct CartWithProductRow {
    product_id: Uuid,
    name: String,
    price: i64,
    stock: i32,
    quantity: i32,
}

pub async fn create_cart(state: &AppState) -> AppResult<ApiResponse<CartView>> {
    let now = Utc::now();
    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::debug!(cart_id = %cart.id, "cart created");
    let view = render(cart.id, &Cart::new(), state.config.tax_rate_percent)?;
    Ok(ApiResponse::success("Cart created", view, Some(Meta::empty())))
}

pub async fn get_cart(state: &AppState, cart_id: Uuid) -> AppResult<ApiResponse<CartView>> {
    ensure_cart(state, cart_id).await?;
    let cart = load_cart(&state.pool, cart_id).await?;
    let meta = Meta::count(cart.lines().len());
    let view = render(cart_id, &cart, state.config.tax_rate_percent)?;
    Ok(ApiResponse::success("Cart", view, Some(meta)))
}

/// Add units of a product; an existing line is merged and the merged
/// quantity is clamped to stock. The cart row stays locked from read to
/// write so concurrent adds cannot lose an increment.
pub async fn add_item(
    state: &AppState,
    cart_id: Uuid,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;

    let mut tx = state.pool.begin().await?;
    lock_cart(&mut *tx, cart_id).await?;
    let mut cart = load_cart(&mut *tx, cart_id).await?;
    let quantity = cart.add(
        ProductSnapshot {
            product_id: product.id,
            name: product.name,
            unit_price: product.price,
            stock: product.stock,
        },
        payload.quantity,
    )?;
    save_quantity(&mut *tx, cart_id, payload.product_id, quantity).await?;
    tx.commit().await?;

    audit::record(
        &state.pool,
        None,
        "cart_update",
        "cart_items",
        serde_json::json!({ "cart_id": cart_id, "product_id": payload.product_id, "quantity": quantity }),
    )
    .await;

    let view = render(cart_id, &cart, state.config.tax_rate_percent)?;
    Ok(ApiResponse::success("OK", view, None))
}

pub async fn set_quantity(
    state: &AppState,
    cart_id: Uuid,
    product_id: Uuid,
    payload: SetQuantityRequest,
) -> AppResult<ApiResponse<CartView>> {
    update_line(state, cart_id, product_id, |cart| {
        cart.set_quantity(product_id, payload.quantity)
    })
    .await
}

pub async fn step_quantity(
    state: &AppState,
    cart_id: Uuid,
    product_id: Uuid,
    step: QuantityStep,
) -> AppResult<ApiResponse<CartView>> {
    update_line(state, cart_id, product_id, |cart| match step {
        QuantityStep::Increment => cart.increment(product_id),
        QuantityStep::Decrement => cart.decrement(product_id),
    })
    .await
}

pub async fn remove_item(
    state: &AppState,
    cart_id: Uuid,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    ensure_cart(state, cart_id).await?;
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
        .bind(cart_id)
        .bind(product_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        None,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "cart_id": cart_id, "product_id": product_id }),
    )
    .await;

    let cart = load_cart(&state.pool, cart_id).await?;
    let view = render(cart_id, &cart, state.config.tax_rate_percent)?;
    Ok(ApiResponse::success("Removed from cart", view, Some(Meta::empty())))
}

pub async fn clear_cart(state: &AppState, cart_id: Uuid) -> AppResult<ApiResponse<CartView>> {
    ensure_cart(state, cart_id).await?;
    sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
        .bind(cart_id)
        .execute(&state.pool)
        .await?;

    let view = render(cart_id, &Cart::new(), state.config.tax_rate_percent)?;
    Ok(ApiResponse::success("Cart cleared", view, Some(Meta::empty())))
}

/// Current lines of a cart, priced with live product data.
pub async fn load_cart<'e, E>(executor: E, cart_id: Uuid) -> AppResult<Cart>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT ci.product_id, p.name, p.price, p.stock, ci.quantity
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY ci.created_at ASC
        "#,
    )
    .bind(cart_id)
    .fetch_all(executor)
    .await?;

    let lines = rows
        .into_iter()
        .map(|row| CartLine {
            product_id: row.product_id,
            name: row.name,
            unit_price: row.price,
            stock: row.stock,
            quantity: row.quantity,
        })
        .collect();
    Ok(Cart::from_lines(lines))
}

pub fn render(cart_id: Uuid, cart: &Cart, tax_rate_percent: i64) -> AppResult<CartView> {
    let totals = CheckoutTotals::for_cart(cart, tax_rate_percent)?;
    let items = cart
        .lines()
        .iter()
        .map(|line| {
            Ok(CartLineView {
                line_total: line.line_total()?,
                line: line.clone(),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;
    Ok(CartView {
        id: cart_id,
        items,
        item_count: cart.item_count(),
        totals,
    })
}

async fn update_line<F>(
    state: &AppState,
    cart_id: Uuid,
    product_id: Uuid,
    apply: F,
) -> AppResult<ApiResponse<CartView>>
where
    F: FnOnce(&mut Cart) -> Result<i32, crate::cart::CartError>,
{
    let mut tx = state.pool.begin().await?;
    lock_cart(&mut *tx, cart_id).await?;
    let mut cart = load_cart(&mut *tx, cart_id).await?;
    if cart.line(product_id).is_none() {
        return Err(AppError::NotFound);
    }
    let quantity = apply(&mut cart)?;
    save_quantity(&mut *tx, cart_id, product_id, quantity).await?;
    tx.commit().await?;

    let view = render(cart_id, &cart, state.config.tax_rate_percent)?;
    Ok(ApiResponse::success("OK", view, None))
}

async fn save_quantity(
    conn: &mut PgConnection,
    cart_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO cart_items (id, cart_id, product_id, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
        .bind(cart_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// `SELECT ... FOR UPDATE` on the cart row; missing carts are 404.
async fn lock_cart(conn: &mut PgConnection, cart_id: Uuid) -> AppResult<()> {
    sqlx::query("SELECT id FROM carts WHERE id = $1 FOR UPDATE")
        .bind(cart_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(())
}

async fn ensure_cart(state: &AppState, cart_id: Uuid) -> AppResult<()> {
    if Carts::find_by_id(cart_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }
    Ok(())
}
