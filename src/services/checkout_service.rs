use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    cart::{Cart, CartError, CartLine, CheckoutTotals},
    dto::{
        addresses::CreateAddressRequest,
        checkout::{CheckoutRequest, CheckoutResponse},
        clients::CreateClientRequest,
        orders::OrderWithDetails,
    },
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        carts::Entity as Carts,
        order_details::ActiveModel as DetailActive,
        orders::ActiveModel as OrderActive,
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::{Address, Bill, Client, DeliveryMethod, Order, OrderDetail, OrderStatus, PaymentType},
    response::{ApiResponse, Meta},
    services::{address_service, bill_service, client_service, required},
    state::AppState,
};

/// Turn a cart into persisted records: client, address, bill, order and
/// one order detail per line. Everything happens in one transaction, so a
/// failure at any step leaves no partial records behind. On success the
/// cart no longer exists.
pub async fn checkout(
    state: &AppState,
    cart_id: Uuid,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let contact = CreateClientRequest {
        name: required("name", &payload.name)?,
        email: client_service::normalize_email(&payload.email)?,
        phone: required("phone", &payload.phone)?,
        address: String::new(),
    };
    let street = required("street", &payload.street)?;
    let number = required("number", &payload.number)?;
    let city = required("city", &payload.city)?;
    let delivery_method = match payload.delivery_method {
        Some(code) => DeliveryMethod::try_from(code)?,
        None => DeliveryMethod::default(),
    };
    let payment_type = payload.payment_type.unwrap_or(PaymentType::Card);

    let txn = state.orm.begin().await?;

    // Locking the cart row serializes concurrent checkouts of the same cart.
    Carts::find_by_id(cart_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = CartItems::find()
        .filter(CartCol::CartId.eq(cart_id))
        .order_by_asc(CartCol::ProductId)
        .all(&txn)
        .await?;

    // Product rows are locked in id order so concurrent checkouts sharing
    // products queue up instead of deadlocking or overselling.
    let product_ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
    let mut products: HashMap<Uuid, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let product = products.remove(&item.product_id).ok_or_else(|| {
            AppError::BadRequest(format!("product {} no longer exists", item.product_id))
        })?;
        lines.push(CartLine {
            product_id: product.id,
            name: product.name,
            unit_price: product.price,
            stock: product.stock,
            quantity: item.quantity,
        });
    }
    let cart = Cart::from_lines(lines);
    ensure_fulfillable(&cart)?;
    let totals = CheckoutTotals::for_cart(&cart, state.config.tax_rate_percent)?;

    let client = client_service::upsert_by_email(
        &txn,
        CreateClientRequest {
            address: format!("{street} {number}, {city}"),
            ..contact
        },
    )
    .await?;

    let address = address_service::insert(
        &txn,
        CreateAddressRequest {
            street,
            number,
            city,
            client_id: client.id,
        },
    )
    .await?;

    let order_id = Uuid::new_v4();
    let bill = bill_service::insert(
        &txn,
        bill_service::build_bill_number(order_id),
        totals.discount,
        totals.total,
        payment_type,
    )
    .await?;

    let now = Utc::now();
    let order = OrderActive {
        id: Set(order_id),
        date: Set(now.into()),
        total: Set(totals.total),
        delivery_method: Set(delivery_method.code()),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        client_id: Set(client.id),
        bill_id: Set(bill.id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut details = Vec::with_capacity(cart.lines().len());
    for line in cart.lines() {
        let detail = DetailActive {
            id: Set(Uuid::new_v4()),
            quantity: Set(line.quantity),
            price: Set(line.unit_price),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
        details.push(OrderDetail::from(detail));

        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(line.quantity))
            .col_expr(ProdCol::UpdatedAt, Expr::value(now))
            .filter(ProdCol::Id.eq(line.product_id))
            .exec(&txn)
            .await?;
    }

    // cart items go with the cart (ON DELETE CASCADE)
    Carts::delete_by_id(cart_id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        client_id = %client.id,
        total = totals.total,
        lines = details.len(),
        "checkout completed"
    );
    audit::record(
        &state.pool,
        None,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "cart_id": cart_id, "total": totals.total }),
    )
    .await;

    let order_history_url = order_history_url(&client.email)?;
    let order = Order::try_from(order)?;
    Ok(ApiResponse::success(
        "Checkout success",
        CheckoutResponse {
            client: Client::from(client),
            address: Address::from(address),
            bill: Bill::try_from(bill)?,
            order: OrderWithDetails { order, details },
            totals,
            order_history_url,
        },
        Some(Meta::empty()),
    ))
}

/// Every line must still be covered by live stock.
pub fn ensure_fulfillable(cart: &Cart) -> AppResult<()> {
    if cart.is_empty() {
        return Err(CartError::Empty.into());
    }
    for line in cart.lines() {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest("cart has invalid quantity".into()));
        }
        if line.stock < line.quantity {
            return Err(AppError::BadRequest(format!(
                "insufficient stock for {} ({} left, {} requested)",
                line.name, line.stock, line.quantity
            )));
        }
    }
    Ok(())
}

/// Storefront link to the customer's order history, query string encoded.
pub fn order_history_url(email: &str) -> AppResult<String> {
    let query = serde_urlencoded::to_string([("email", email)])
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(format!("/api/order-history?{query}"))
}
