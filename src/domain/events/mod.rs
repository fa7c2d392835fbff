//! Domain events
//!
//! Facts about bookings that leave the system through the notification outbox.

pub mod types;

pub use types::{AppointmentNotification, EventMessage, NotificationEvent};
