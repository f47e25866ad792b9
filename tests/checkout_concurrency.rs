use sea_orm::EntityTrait;
use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        cart::AddToCartRequest, categories::CreateCategoryRequest, checkout::CheckoutRequest,
        products::CreateProductRequest,
    },
    entity::products,
    error::AppError,
    middleware::auth::{AuthUser, ROLE_ADMIN},
    services::{cart_service, category_service, checkout_service, product_service},
    state::AppState,
};
use uuid::Uuid;

// Row locks serialize writers: two carts holding the whole stock of one
// product check out at once and exactly one gets through; parallel adds to
// one cart all land.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cart_and_checkout_writes() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let product_id = seed_product(&state, 4).await?;

    let first = cart_with(&state, product_id, 4).await?;
    let second = cart_with(&state, product_id, 4).await?;

    let (a, b) = tokio::join!(
        checkout_service::checkout(&state, first, checkout_request("first")),
        checkout_service::checkout(&state, second, checkout_request("second")),
    );

    let succeeded = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(succeeded, 1, "exactly one checkout should win");
    let failure = a.err().or(b.err()).expect("one checkout failed");
    assert!(matches!(failure, AppError::BadRequest(msg) if msg.contains("insufficient stock")));

    let product = products::Entity::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .expect("product exists");
    assert_eq!(product.stock, 0);

    // Concurrent adds of the same product to one cart must all count.
    let product_id = seed_product(&state, 50).await?;
    let cart = cart_service::create_cart(&state).await?.data.expect("cart");

    let add = || {
        cart_service::add_item(
            &state,
            cart.id,
            AddToCartRequest {
                product_id,
                quantity: 1,
            },
        )
    };
    let (a, b, c) = tokio::join!(add(), add(), add());
    a?;
    b?;
    c?;

    let view = cart_service::get_cart(&state, cart.id)
        .await?
        .data
        .expect("cart view");
    assert_eq!(view.item_count, 3);

    Ok(())
}

async fn cart_with(state: &AppState, product_id: Uuid, quantity: i32) -> anyhow::Result<Uuid> {
    let cart = cart_service::create_cart(state).await?.data.expect("cart");
    cart_service::add_item(
        state,
        cart.id,
        AddToCartRequest {
            product_id,
            quantity,
        },
    )
    .await?;
    Ok(cart.id)
}

fn checkout_request(tag: &str) -> CheckoutRequest {
    CheckoutRequest {
        name: format!("Buyer {tag}"),
        email: format!("{tag}-{}@example.com", Uuid::new_v4().simple()),
        phone: "555-0101".into(),
        street: "Elm St".into(),
        number: "7".into(),
        city: "Shelbyville".into(),
        delivery_method: None,
        payment_type: None,
    }
}

async fn seed_product(state: &AppState, stock: i32) -> anyhow::Result<Uuid> {
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: ROLE_ADMIN.into(),
    };
    let suffix = Uuid::new_v4().simple().to_string();
    let category = category_service::create_category(
        state,
        &admin,
        CreateCategoryRequest {
            name: format!("Limited {suffix}"),
            description: String::new(),
        },
    )
    .await?
    .data
    .expect("category");

    let product = product_service::create_product(
        state,
        &admin,
        CreateProductRequest {
            name: format!("Limited item {suffix}"),
            description: String::new(),
            price: 1_500,
            stock,
            category_id: category.id,
            image_url: None,
        },
    )
    .await?
    .data
    .expect("product");
    Ok(product.id)
}

// No truncation here: every row this file creates has a unique name, so it
// can share a database with the other flow tests.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run checkout concurrency tests."
            );
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let config = AppConfig {
        database_url,
        jwt_secret: "test-secret".into(),
        host: "127.0.0.1".into(),
        port: 0,
        tax_rate_percent: 16,
        low_stock_threshold: 10,
    };
    Ok(Some(AppState::new(orm, config)))
}
