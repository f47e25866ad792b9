pub mod addresses;
pub mod bills;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod clients;
pub mod order_details;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

pub use addresses::Entity as Addresses;
pub use bills::Entity as Bills;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use clients::Entity as Clients;
pub use order_details::Entity as OrderDetails;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
