//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_identity;
mod m20240101_000002_create_catalog;
mod m20240101_000003_create_salon_services;
mod m20240101_000004_create_appointments;
mod m20240101_000005_create_commerce;
mod m20240101_000006_create_notification_outbox;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_identity::Migration),
            Box::new(m20240101_000002_create_catalog::Migration),
            Box::new(m20240101_000003_create_salon_services::Migration),
            Box::new(m20240101_000004_create_appointments::Migration),
            Box::new(m20240101_000005_create_commerce::Migration),
            Box::new(m20240101_000006_create_notification_outbox::Migration),
        ]
    }
}
