//! Cart/order subsystem
//!
//! One canonical cart per user, looked up regardless of its active flag.
//! Checkout snapshots current product prices into order items and
//! empties the cart in a single transaction.

mod cart;
mod order;
mod resources;
mod views;

pub use cart::CartService;
pub use order::OrderService;
pub use resources::{CartItemResource, CartResource, OrderItemResource, OrderResource};
pub use views::{cart_views, order_views};
