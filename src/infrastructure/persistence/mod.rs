//! PostgreSQL repository implementations.

mod pg_category_repository;

pub use pg_category_repository::PgCategoryRepository;
