//! Appointment booking rules and shapes

pub mod dto;
pub mod pricing;
pub mod status;

pub use dto::*;
pub use pricing::{final_price, ServiceSelection, DYE_SURCHARGE};
pub use status::AppointmentStatus;
