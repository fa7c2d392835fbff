//! SeaORM entities

pub mod appointment;
pub mod cart;
pub mod cart_item;
pub mod category;
pub mod city;
pub mod dying;
pub mod facial_hair;
pub mod hairstyle;
pub mod length;
pub mod manufacturer;
pub mod notification_outbox;
pub mod order;
pub mod order_item;
pub mod product;
pub mod review;
pub mod role;
pub mod status;
pub mod user;
pub mod user_role;
