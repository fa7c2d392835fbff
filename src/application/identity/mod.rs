//! Users and their role assignments

pub mod user;

pub use user::{is_hairdresser, UserResource};
