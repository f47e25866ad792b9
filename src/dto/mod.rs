pub mod addresses;
pub mod auth;
pub mod bills;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod clients;
pub mod dashboard;
pub mod order_details;
pub mod orders;
pub mod products;
pub mod reviews;
