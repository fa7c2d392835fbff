//! Catalog request, search and response shapes

pub mod product;
pub mod reference;
pub mod services;
pub mod taxonomy;

pub use product::*;
pub use reference::*;
pub use services::*;
pub use taxonomy::*;
