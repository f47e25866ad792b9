use storefront_api::{
    config::AppConfig,
    db::{DbPool, create_orm_conn, run_migrations},
    middleware::auth::ROLE_ADMIN,
    services::auth_service::hash_password,
    state::AppState,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let state = AppState::new(orm, config);

    let admin_email =
        std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let admin_password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin12345".to_string());
    let admin_id = ensure_admin(&state.pool, &admin_email, &admin_password).await?;
    seed_catalog(&state.pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_admin(pool: &DbPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(ROLE_ADMIN)
    .fetch_one(pool)
    .await?;

    println!("Ensured admin {email}");
    Ok(user_id)
}

async fn ensure_category(pool: &DbPool, name: &str, description: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, description)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_catalog(pool: &DbPool) -> anyhow::Result<()> {
    let apparel = ensure_category(pool, "Apparel", "Shirts, hoodies and caps").await?;
    let kitchen = ensure_category(pool, "Kitchen", "Mugs and bottles").await?;
    let accessories = ensure_category(pool, "Accessories", "Small things for your desk").await?;

    // Prices in cents.
    let products = [
        ("Classic Hoodie", "Heavyweight cotton hoodie", 5_499, 40, apparel),
        ("Logo T-Shirt", "Soft tee with a printed logo", 1_999, 120, apparel),
        ("Trucker Cap", "Adjustable mesh cap", 1_499, 8, apparel),
        ("Ceramic Mug", "350 ml, dishwasher safe", 1_250, 75, kitchen),
        ("Steel Bottle", "Insulated, keeps drinks cold", 2_400, 5, kitchen),
        ("Sticker Pack", "Ten vinyl stickers", 499, 300, accessories),
        ("Desk Mat", "Large stitched-edge desk mat", 2_999, 0, accessories),
    ];

    for (name, description, price, stock, category_id) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, stock, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(price as i64)
        .bind(stock as i32)
        .bind(category_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
