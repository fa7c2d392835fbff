//! Booking notifications: outbox writes and the relay that drains them

pub mod outbox;
pub mod relay;

pub use relay::{relay_pending, NotificationRelay, RelayReport};
