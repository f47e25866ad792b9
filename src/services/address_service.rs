use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::addresses::{AddressList, AddressQuery, CreateAddressRequest},
    entity::{
        addresses::{ActiveModel, Column, Entity as Addresses, Model as AddressModel},
        clients::Entity as Clients,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Address,
    response::{ApiResponse, Meta},
    services::required,
    state::AppState,
};

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
    query: AddressQuery,
) -> AppResult<ApiResponse<AddressList>> {
    ensure_admin(user)?;
    let mut finder = Addresses::find();
    if let Some(client_id) = query.client_id {
        finder = finder.filter(Column::ClientId.eq(client_id));
    }
    let items: Vec<Address> = finder
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Address::from)
        .collect();
    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Addresses", AddressList { items }, Some(meta)))
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    ensure_admin(user)?;
    let address = insert(&state.orm, payload).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "address_create",
        "addresses",
        serde_json::json!({ "address_id": address.id, "client_id": address.client_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Address created",
        address.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Addresses::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "address_delete",
        "addresses",
        serde_json::json!({ "address_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Validate and store an address for an existing client.
pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    payload: CreateAddressRequest,
) -> AppResult<AddressModel> {
    let street = required("street", &payload.street)?;
    let number = required("number", &payload.number)?;
    let city = required("city", &payload.city)?;
    if Clients::find_by_id(payload.client_id)
        .one(conn)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest("client not found".into()));
    }

    let now = Utc::now();
    let address = ActiveModel {
        id: Set(Uuid::new_v4()),
        street: Set(street),
        number: Set(number),
        city: Set(city),
        client_id: Set(payload.client_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(conn)
    .await?;
    Ok(address)
}
