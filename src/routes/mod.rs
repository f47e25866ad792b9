use axum::Router;

use crate::state::AppState;

pub mod addresses;
pub mod auth;
pub mod bills;
pub mod carts;
pub mod categories;
pub mod clients;
pub mod dashboard;
pub mod doc;
pub mod health;
pub mod order_details;
pub mod orders;
pub mod params;
pub mod products;
pub mod reviews;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/clients", clients::router())
        .nest("/addresses", addresses::router())
        .nest("/bills", bills::router())
        .nest("/orders", orders::router())
        .nest("/order_details", order_details::router())
        .nest("/reviews", reviews::router())
        .nest("/carts", carts::router())
        .nest("/dashboard", dashboard::router())
        .route(
            "/order-history",
            axum::routing::get(orders::order_history),
        )
}
