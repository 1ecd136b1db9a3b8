//! Database migrations for the Formapilot admin API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_06_01_000001_create_rendezvous;
mod m2025_06_01_000002_create_programmes;
mod m2025_06_01_000003_create_users;
mod m2025_06_01_000004_create_veille_items;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_06_01_000001_create_rendezvous::Migration),
            Box::new(m2025_06_01_000002_create_programmes::Migration),
            Box::new(m2025_06_01_000003_create_users::Migration),
            Box::new(m2025_06_01_000004_create_veille_items::Migration),
        ]
    }
}
