//! PostgreSQL implementation of the category repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Category, CategoryCourseCount, CategoryPatch, NewCategory};
use crate::domain::repositories::{CategoryFilter, CategoryRepository};
use crate::error::AppError;

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, parent_id, is_active, display_order, created_at, updated_at";

/// PostgreSQL repository for category tree storage and course associations.
///
/// Uses runtime-checked prepared statements. Mutations that touch more than
/// one row (`move_to_parent`, `delete`) execute inside a single transaction;
/// concurrent mutations of the same sibling set serialize at the database's
/// isolation level.
pub struct PgCategoryRepository {
    pool: Arc<PgPool>,
}

impl PgCategoryRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// `1 + max(display_order)` among the children of `parent_id` on one connection.
async fn next_display_order_on(
    conn: &mut PgConnection,
    parent_id: Option<i64>,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        "SELECT COALESCE(MAX(display_order) + 1, 0) FROM categories
         WHERE parent_id IS NOT DISTINCT FROM $1",
    )
    .bind(parent_id)
    .fetch_one(conn)
    .await
}

/// Re-numbers the children of `parent_id` to `0..n-1`, preserving relative order.
async fn reindex_siblings_on(
    conn: &mut PgConnection,
    parent_id: Option<i64>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        WITH ranked AS (
            SELECT id, (ROW_NUMBER() OVER (ORDER BY display_order, id) - 1)::int AS new_order
            FROM categories
            WHERE parent_id IS NOT DISTINCT FROM $1
        )
        UPDATE categories c
        SET display_order = r.new_order, updated_at = NOW()
        FROM ranked r
        WHERE c.id = r.id AND c.display_order IS DISTINCT FROM r.new_order
        "#,
    )
    .bind(parent_id)
    .execute(conn)
    .await?;

    Ok(())
}

/// Decrements `display_order` of every child of `parent_id` ordered past
/// `threshold_order`, closing the gap left by a deletion or move-out.
async fn shift_display_order_down(
    conn: &mut PgConnection,
    parent_id: Option<i64>,
    threshold_order: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE categories
         SET display_order = display_order - 1, updated_at = NOW()
         WHERE parent_id IS NOT DISTINCT FROM $1 AND display_order > $2",
    )
    .bind(parent_id)
    .bind(threshold_order)
    .execute(conn)
    .await?;

    Ok(())
}

fn not_found(id: i64) -> AppError {
    AppError::not_found("Category not found", json!({ "id": id }))
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn get(&self, id: i64) -> Result<Option<Category>, AppError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, AppError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
        filter: CategoryFilter,
    ) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS} FROM categories
            WHERE ($1::boolean IS NULL OR is_active = $1)
              AND (
                    NOT $2
                    OR ($3::bigint IS NULL AND parent_id IS NULL)
                    OR parent_id = $3
                  )
            ORDER BY parent_id NULLS FIRST, display_order
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.is_active)
        .bind(filter.parent_id.is_some())
        .bind(filter.parent_id.flatten())
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn count(&self, filter: CategoryFilter) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM categories
            WHERE ($1::boolean IS NULL OR is_active = $1)
              AND (
                    NOT $2
                    OR ($3::bigint IS NULL AND parent_id IS NULL)
                    OR parent_id = $3
                  )
            "#,
        )
        .bind(filter.is_active)
        .bind(filter.parent_id.is_some())
        .bind(filter.parent_id.flatten())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn children_of(&self, parent_id: Option<i64>) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE parent_id IS NOT DISTINCT FROM $1
             ORDER BY display_order"
        ))
        .bind(parent_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn all(&self, active_only: bool) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE NOT $1 OR is_active
             ORDER BY parent_id NULLS FIRST, display_order"
        ))
        .bind(active_only)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn all_slugs(&self) -> Result<Vec<String>, AppError> {
        let slugs = sqlx::query_scalar::<_, String>("SELECT slug FROM categories")
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(slugs)
    }

    async fn next_display_order(&self, parent_id: Option<i64>) -> Result<i32, AppError> {
        let mut conn = self.pool.acquire().await?;
        let next = next_display_order_on(&mut *conn, parent_id).await?;

        Ok(next)
    }

    async fn create(&self, new: NewCategory) -> Result<Category, AppError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (name, slug, description, parent_id, is_active, display_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.slug)
        .bind(&new.description)
        .bind(new.parent_id)
        .bind(new.is_active)
        .bind(new.display_order)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn update_fields(&self, id: i64, patch: CategoryPatch) -> Result<Category, AppError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.slug)
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.is_active)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.ok_or_else(|| not_found(id))
    }

    async fn move_to_parent(
        &self,
        id: i64,
        old_parent_id: Option<i64>,
        new_parent_id: Option<i64>,
        patch: CategoryPatch,
    ) -> Result<Category, AppError> {
        let mut tx = self.pool.begin().await?;

        // The moved category becomes the last child of its new parent.
        let display_order = next_display_order_on(&mut *tx, new_parent_id).await?;

        let row = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET parent_id = $2,
                display_order = $3,
                name = COALESCE($4, name),
                slug = COALESCE($5, slug),
                description = CASE WHEN $6 THEN $7 ELSE description END,
                is_active = COALESCE($8, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(new_parent_id)
        .bind(display_order)
        .bind(&patch.name)
        .bind(&patch.slug)
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.is_active)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = row else {
            return Err(not_found(id));
        };

        reindex_siblings_on(&mut *tx, old_parent_id).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let target = sqlx::query_as::<_, (Option<i64>, i32)>(
            "SELECT parent_id, display_order FROM categories WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((old_parent_id, old_order)) = target else {
            return Err(not_found(id));
        };

        // Direct children become roots, appended after the existing ones in
        // their prior relative order.
        sqlx::query(
            r#"
            WITH base AS (
                SELECT COALESCE(MAX(display_order) + 1, 0) AS next_order
                FROM categories WHERE parent_id IS NULL
            ),
            ranked AS (
                SELECT id, (ROW_NUMBER() OVER (ORDER BY display_order, id) - 1)::int AS rank
                FROM categories WHERE parent_id = $1
            )
            UPDATE categories c
            SET parent_id = NULL,
                display_order = base.next_order + ranked.rank,
                updated_at = NOW()
            FROM base, ranked
            WHERE c.id = ranked.id
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        shift_display_order_down(&mut *tx, old_parent_id, old_order).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn reindex_siblings(&self, parent_id: Option<i64>) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        reindex_siblings_on(&mut *conn, parent_id).await?;

        Ok(())
    }

    async fn link_course(&self, course_id: i64, category_id: i64) -> Result<(), AppError> {
        sqlx::query("INSERT INTO course_categories (course_id, category_id) VALUES ($1, $2)")
            .bind(course_id)
            .bind(category_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn unlink_course(&self, course_id: i64, category_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM course_categories WHERE course_id = $1 AND category_id = $2")
            .bind(course_id)
            .bind(category_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn category_ids_for_course(&self, course_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT category_id FROM course_categories WHERE course_id = $1 ORDER BY category_id",
        )
        .bind(course_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ids)
    }

    async fn categories_for_course(&self, course_id: i64) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name, c.slug, c.description, c.parent_id, c.is_active,
                   c.display_order, c.created_at, c.updated_at
            FROM categories c
            JOIN course_categories cc ON cc.category_id = c.id
            WHERE cc.course_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(course_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn course_ids_for_categories(
        &self,
        category_ids: &[i64],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT course_id FROM course_categories
             WHERE category_id = ANY($1)
             ORDER BY course_id
             LIMIT $2 OFFSET $3",
        )
        .bind(category_ids)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ids)
    }

    async fn count_courses_for_categories(&self, category_ids: &[i64]) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT course_id) FROM course_categories WHERE category_id = ANY($1)",
        )
        .bind(category_ids)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn course_counts(&self) -> Result<Vec<CategoryCourseCount>, AppError> {
        let counts = sqlx::query_as::<_, CategoryCourseCount>(
            r#"
            SELECT c.id AS category_id, COUNT(cc.course_id) AS course_count
            FROM categories c
            LEFT JOIN course_categories cc ON cc.category_id = c.id
            GROUP BY c.id
            ORDER BY c.id
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(counts)
    }
}
