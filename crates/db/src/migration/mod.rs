//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration and written with the
//! schema builder so they run on PostgreSQL and SQLite alike.

pub use sea_orm_migration::prelude::*;

mod m20261001_000001_catalog;
mod m20261001_000002_time_entries;
mod m20261001_000003_export_closures;
mod m20261001_000004_audit_log;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_catalog::Migration),
            Box::new(m20261001_000002_time_entries::Migration),
            Box::new(m20261001_000003_export_closures::Migration),
            Box::new(m20261001_000004_audit_log::Migration),
        ]
    }
}
