//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20261001_000001_create_user_table;
mod m20261001_000002_create_following_table;
mod m20261001_000003_create_tag_table;
mod m20261001_000004_create_ingredient_table;
mod m20261001_000005_create_recipe_tables;
mod m20261001_000006_create_favorite_table;
mod m20261001_000007_create_shopping_cart_item_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_user_table::Migration),
            Box::new(m20261001_000002_create_following_table::Migration),
            Box::new(m20261001_000003_create_tag_table::Migration),
            Box::new(m20261001_000004_create_ingredient_table::Migration),
            Box::new(m20261001_000005_create_recipe_tables::Migration),
            Box::new(m20261001_000006_create_favorite_table::Migration),
            Box::new(m20261001_000007_create_shopping_cart_item_table::Migration),
        ]
    }
}
