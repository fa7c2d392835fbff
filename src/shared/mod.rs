pub mod errors;
pub mod pagination;
pub mod shutdown;
pub mod validation;

pub use errors::*;
pub use pagination::*;
pub use shutdown::*;
