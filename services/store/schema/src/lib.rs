//! sea-orm entities for the store database.

pub mod brands;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod users;
