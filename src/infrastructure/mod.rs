//! Infrastructure layer: persistence and outbound adapters

pub mod database;
pub mod notifications;

pub use database::{init_database, DatabaseConfig};
