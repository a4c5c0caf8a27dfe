pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_users;
mod m20261001_000002_create_categories;
mod m20261001_000003_create_brands;
mod m20261001_000004_create_products;
mod m20261001_000005_create_carts;
mod m20261001_000006_create_orders;
mod m20261001_000007_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_users::Migration),
            Box::new(m20261001_000002_create_categories::Migration),
            Box::new(m20261001_000003_create_brands::Migration),
            Box::new(m20261001_000004_create_products::Migration),
            Box::new(m20261001_000005_create_carts::Migration),
            Box::new(m20261001_000006_create_orders::Migration),
            Box::new(m20261001_000007_add_lookup_indexes::Migration),
        ]
    }
}
