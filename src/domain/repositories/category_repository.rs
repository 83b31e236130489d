//! Repository trait for category tree and course-association data access.

use crate::domain::entities::{Category, CategoryCourseCount, CategoryPatch, NewCategory};
use crate::error::AppError;
use async_trait::async_trait;

/// Filters applied to category listing queries.
///
/// `parent_id: Some(None)` selects roots only; `Some(Some(id))` selects the
/// children of `id`; `None` applies no parent filter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryFilter {
    pub parent_id: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

/// Repository interface for the persisted category tree.
///
/// Durable storage and sibling queries only; business rules (cycle detection,
/// slug generation, existence checks) live in
/// [`crate::application::services::CategoryService`]. Mutations that touch
/// more than one row (`move_to_parent`, `delete`) run inside a single
/// database transaction so no partial reordering is ever persisted.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCategoryRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Finds a category by id.
    async fn get(&self, id: i64) -> Result<Option<Category>, AppError>;

    /// Finds a category by its unique slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, AppError>;

    /// Lists categories matching `filter`, ordered by `display_order` within
    /// parent, with `LIMIT`/`OFFSET` pagination.
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        filter: CategoryFilter,
    ) -> Result<Vec<Category>, AppError>;

    /// Counts categories matching `filter`.
    async fn count(&self, filter: CategoryFilter) -> Result<i64, AppError>;

    /// Direct children of `parent_id` (or roots when `None`), ordered by
    /// `display_order` ascending.
    async fn children_of(&self, parent_id: Option<i64>) -> Result<Vec<Category>, AppError>;

    /// All categories, optionally restricted to active ones. Used for
    /// hierarchy assembly.
    async fn all(&self, active_only: bool) -> Result<Vec<Category>, AppError>;

    /// Every slug currently in use, active or not.
    async fn all_slugs(&self) -> Result<Vec<String>, AppError>;

    /// `1 + max(display_order)` among the children of `parent_id`, or `0`
    /// when there are none.
    async fn next_display_order(&self, parent_id: Option<i64>) -> Result<i32, AppError>;

    /// Inserts a new category row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] on a slug collision (unique constraint).
    async fn create(&self, new: NewCategory) -> Result<Category, AppError>;

    /// Partially updates a category in place. Only fields present in
    /// [`CategoryPatch`] are modified; `updated_at` is always refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no row matches `id`.
    async fn update_fields(&self, id: i64, patch: CategoryPatch) -> Result<Category, AppError>;

    /// Moves a category under a new parent as its last child, applying any
    /// other field changes from `patch`, then re-numbers the old parent's
    /// remaining children to close the gap. Runs in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no row matches `id`.
    async fn move_to_parent(
        &self,
        id: i64,
        old_parent_id: Option<i64>,
        new_parent_id: Option<i64>,
        patch: CategoryPatch,
    ) -> Result<Category, AppError>;

    /// Deletes a category row. Direct children are re-parented to root first,
    /// appended after existing roots in their prior relative order, and the
    /// deleted node's former siblings are re-numbered. Runs in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no row matches `id`.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Re-numbers all children of `parent_id` to `0..n-1` preserving their
    /// relative order.
    async fn reindex_siblings(&self, parent_id: Option<i64>) -> Result<(), AppError>;

    // ── Course associations ─────────────────────────────────────────────────

    /// Inserts a `(course_id, category_id)` association row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the pair already exists.
    async fn link_course(&self, course_id: i64, category_id: i64) -> Result<(), AppError>;

    /// Removes a `(course_id, category_id)` association row, if present.
    async fn unlink_course(&self, course_id: i64, category_id: i64) -> Result<(), AppError>;

    /// Category ids associated with `course_id`.
    async fn category_ids_for_course(&self, course_id: i64) -> Result<Vec<i64>, AppError>;

    /// Full category rows associated with `course_id`, ordered by id.
    async fn categories_for_course(&self, course_id: i64) -> Result<Vec<Category>, AppError>;

    /// Distinct course ids associated with any of `category_ids`, paginated.
    async fn course_ids_for_categories(
        &self,
        category_ids: &[i64],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<i64>, AppError>;

    /// Total distinct courses associated with any of `category_ids`.
    async fn count_courses_for_categories(&self, category_ids: &[i64]) -> Result<i64, AppError>;

    /// Per-category course counts across all categories.
    async fn course_counts(&self) -> Result<Vec<CategoryCourseCount>, AppError>;
}
