//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod cache_admin;
pub mod categories;
pub mod course_links;
pub mod health;

pub use cache_admin::{
    cache_clear_handler, cache_health_handler, cache_stats_handler, cache_test_handler,
    cache_warm_handler,
};
pub use categories::{
    courses_for_category_handler, create_category_handler, delete_category_handler,
    get_category_by_slug_handler, get_category_handler, hierarchy_handler,
    list_categories_handler, update_category_handler,
};
pub use course_links::{
    associate_courses_handler, disassociate_courses_handler, get_course_categories_handler,
    replace_course_categories_handler,
};
pub use health::health_handler;
