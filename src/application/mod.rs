//! Application layer
//!
//! Use cases on top of the persistence layer: generic CRUD resources,
//! booking, cart and orders, analytics, recommendations and the
//! notification relay.

pub mod analytics;
pub mod booking;
pub mod catalog;
pub mod commerce;
pub mod crud;
pub mod identity;
pub mod notifications;
pub mod recommendation;
