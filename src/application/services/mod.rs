//! Business-logic services.

pub mod category_service;

pub use category_service::{CategoryService, CategoryUpdate, Page};
