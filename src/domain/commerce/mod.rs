//! Cart and order shapes

pub mod dto;
pub mod order_number;

pub use dto::*;
pub use order_number::format_order_number;
