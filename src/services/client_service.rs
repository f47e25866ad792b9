use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::clients::{ClientList, CreateClientRequest, UpdateClientRequest},
    entity::{
        clients::{ActiveModel, Column, Entity as Clients, Model as ClientModel},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Client,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::required,
    state::AppState,
};

pub async fn list_clients(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ClientList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();
    let finder = Clients::find().order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Client::from)
        .collect();
    Ok(ApiResponse::success(
        "Clients",
        ClientList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_client(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Client>> {
    ensure_admin(user)?;
    let client = Clients::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Client", client.into(), None))
}

pub async fn create_client(
    state: &AppState,
    user: &AuthUser,
    payload: CreateClientRequest,
) -> AppResult<ApiResponse<Client>> {
    ensure_admin(user)?;
    let payload = validate(payload)?;
    if find_by_email(&state.orm, &payload.email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "client with email {} already exists",
            payload.email
        )));
    }
    let client = insert(&state.orm, payload).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "client_create",
        "clients",
        serde_json::json!({ "client_id": client.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Client created",
        client.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_client(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateClientRequest,
) -> AppResult<ApiResponse<Client>> {
    ensure_admin(user)?;
    let existing = Clients::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(required("name", &name)?);
    }
    if let Some(email) = payload.email {
        let email = normalize_email(&email)?;
        if let Some(other) = find_by_email(&state.orm, &email).await? {
            if other.id != id {
                return Err(AppError::Conflict(format!(
                    "client with email {email} already exists"
                )));
            }
        }
        active.email = Set(email);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(required("phone", &phone)?);
    }
    if let Some(address) = payload.address {
        active.address = Set(required("address", &address)?);
    }
    active.updated_at = Set(Utc::now().into());
    let client = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "client_update",
        "clients",
        serde_json::json!({ "client_id": client.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        client.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_client(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let orders = Orders::find()
        .filter(OrderCol::ClientId.eq(id))
        .count(&state.orm)
        .await?;
    if orders > 0 {
        return Err(AppError::Conflict(
            "client has orders and cannot be deleted".into(),
        ));
    }

    let result = Clients::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "client_delete",
        "clients",
        serde_json::json!({ "client_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Reuse the client registered under the same email, refreshing its
/// contact data, or create a new one.
pub async fn upsert_by_email<C: ConnectionTrait>(
    conn: &C,
    payload: CreateClientRequest,
) -> AppResult<ClientModel> {
    let payload = validate(payload)?;
    match find_by_email(conn, &payload.email).await? {
        Some(existing) => {
            let mut active: ActiveModel = existing.into();
            active.name = Set(payload.name);
            active.phone = Set(payload.phone);
            active.address = Set(payload.address);
            active.updated_at = Set(Utc::now().into());
            Ok(active.update(conn).await?)
        }
        None => insert(conn, payload).await,
    }
}

pub async fn find_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> AppResult<Option<ClientModel>> {
    Ok(Clients::find()
        .filter(Column::Email.eq(email))
        .one(conn)
        .await?)
}

pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = required("email", email)?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::BadRequest("email is invalid".into())),
    }
}

fn validate(payload: CreateClientRequest) -> AppResult<CreateClientRequest> {
    Ok(CreateClientRequest {
        name: required("name", &payload.name)?,
        email: normalize_email(&payload.email)?,
        phone: required("phone", &payload.phone)?,
        address: required("address", &payload.address)?,
    })
}

async fn insert<C: ConnectionTrait>(conn: &C, payload: CreateClientRequest) -> AppResult<ClientModel> {
    let now = Utc::now();
    let client = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        email: Set(payload.email),
        phone: Set(payload.phone),
        address: Set(payload.address),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(conn)
    .await?;
    Ok(client)
}
