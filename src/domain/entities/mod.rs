//! Core business data structures.

pub mod category;

pub use category::{
    Category, CategoryCourseCount, CategoryNode, CategoryPatch, NewCategory,
};
