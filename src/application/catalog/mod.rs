//! Catalog resources served by the generic CRUD engine

pub mod category;
pub mod manufacturer;
pub mod product;
pub mod reference;
pub mod services;

pub use category::CategoryResource;
pub use manufacturer::ManufacturerResource;
pub use product::{product_views, ProductResource};
pub use reference::{CityResource, LengthResource, StatusResource};
pub use services::{DyingResource, FacialHairResource, HairstyleResource};
