//! Domain layer
//!
//! Request/response shapes, pure business rules (pricing, status ids,
//! order numbering), notification events and outbound ports.

pub mod analytics;
pub mod booking;
pub mod catalog;
pub mod commerce;
pub mod events;
pub mod identity;
pub mod ports;

pub use crate::shared::{DomainError, DomainResult};
