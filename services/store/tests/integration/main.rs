mod helpers;

mod cart_test;
mod catalog_test;
mod order_test;
mod router_test;
mod seed_test;
