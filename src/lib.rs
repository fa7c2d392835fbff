//! # Salon Core
//!
//! Backend core for a hair salon: service catalog, appointment booking,
//! a small retail shop with carts and orders, reviews, reporting and
//! product recommendations.
//!
//! ## Architecture
//!
//! - **domain**: request/response shapes, pricing rules, events and ports
//! - **application**: CRUD resources, booking, commerce, analytics, recommender
//! - **infrastructure**: SeaORM entities, migrations, notification dispatch
//! - **shared**: errors, paging, validation and shutdown handling

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::database::{init_database, DatabaseConfig};

pub use shared::{DomainError, DomainResult, ShutdownCoordinator, ShutdownSignal};
