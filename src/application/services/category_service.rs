//! Category tree orchestration service.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::entities::{
    Category, CategoryCourseCount, CategoryNode, CategoryPatch, NewCategory,
};
use crate::domain::repositories::{CategoryFilter, CategoryRepository};
use crate::error::AppError;
use crate::infrastructure::cache::{CacheLayer, keys};
use crate::utils::slug::{slugify, uniquify};

/// Partial update accepted by [`CategoryService::update`].
///
/// `None` fields are left unchanged. `parent_id: Some(None)` moves the
/// category to the root level; `Some(Some(id))` moves it under `id`.
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub parent_id: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

/// One page of a listing plus the unpaginated total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Service for managing the category tree and course associations.
///
/// Coordinates the repository and the cache-aside layer: every read goes
/// through the cache, every write goes to the store first and invalidates the
/// affected cache entries only after the store transaction has committed.
/// Tree-integrity checks (parent existence, self-parenting, cycles) all run
/// before any row is mutated.
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    cache: CacheLayer,
}

impl CategoryService {
    /// Creates a new category service.
    pub fn new(repo: Arc<dyn CategoryRepository>, cache: CacheLayer) -> Self {
        Self { repo, cache }
    }

    /// Creates a category as the last sibling under `parent_id` (or at the
    /// root level).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `parent_id` does not resolve to an
    /// existing category, and [`AppError::Conflict`] on a slug collision lost
    /// to a concurrent insert.
    pub async fn create(
        &self,
        name: String,
        description: Option<String>,
        parent_id: Option<i64>,
        is_active: bool,
    ) -> Result<Category, AppError> {
        if let Some(pid) = parent_id {
            self.ensure_parent_exists(pid).await?;
        }

        let slug = self.generate_slug(&name, None).await?;
        let display_order = self.repo.next_display_order(parent_id).await?;

        let created = self
            .repo
            .create(NewCategory {
                name,
                slug,
                description,
                parent_id,
                is_active,
                display_order,
            })
            .await?;

        self.cache
            .invalidate_category_write(Some(created.id), None, &[parent_id])
            .await;

        Ok(created)
    }

    /// Fetches a category by id, cache-aside.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no category matches.
    pub async fn get(&self, id: i64) -> Result<Category, AppError> {
        let key = keys::id_key(id);
        if let Some(hit) = self.cache.get_json::<Category>(&key).await {
            return Ok(hit);
        }

        let category = self
            .repo
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found", json!({ "id": id })))?;

        self.cache
            .set_json(&key, &category, self.cache.point_ttl())
            .await;

        Ok(category)
    }

    /// Fetches a category by slug, cache-aside.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no category matches.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, AppError> {
        let key = keys::slug_key(slug);
        if let Some(hit) = self.cache.get_json::<Category>(&key).await {
            return Ok(hit);
        }

        let category = self.repo.find_by_slug(slug).await?.ok_or_else(|| {
            AppError::not_found("Category not found", json!({ "slug": slug }))
        })?;

        self.cache
            .set_json(&key, &category, self.cache.point_ttl())
            .await;

        Ok(category)
    }

    /// Paginated category listing with optional parent and activity filters,
    /// cache-aside per parameter combination.
    pub async fn list(
        &self,
        page: u32,
        limit: u32,
        parent_id: Option<Option<i64>>,
        is_active: Option<bool>,
    ) -> Result<Page<Category>, AppError> {
        let key = keys::list_key(page, limit, parent_id, is_active);
        if let Some(hit) = self.cache.get_json::<Page<Category>>(&key).await {
            return Ok(hit);
        }

        let filter = CategoryFilter {
            parent_id,
            is_active,
        };
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let items = self.repo.list(i64::from(limit), offset, filter).await?;
        let total = self.repo.count(filter).await?;

        let result = Page { items, total };
        self.cache
            .set_json(&key, &result, self.cache.list_ttl())
            .await;

        Ok(result)
    }

    /// Returns the assembled category forest, cache-aside keyed by the
    /// activity filter.
    pub async fn get_hierarchy(&self, active_only: bool) -> Result<Vec<CategoryNode>, AppError> {
        let key = keys::hierarchy_key(active_only);
        if let Some(hit) = self.cache.get_json::<Vec<CategoryNode>>(&key).await {
            return Ok(hit);
        }

        let categories = self.repo.all(active_only).await?;
        let forest = CategoryNode::build_forest(categories);

        self.cache
            .set_json(&key, &forest, self.cache.list_ttl())
            .await;

        Ok(forest)
    }

    /// Applies a partial update, moving the category to a new parent when
    /// `parent_id` is present and differs from the current one.
    ///
    /// The slug is regenerated only when the name actually changes. A move
    /// appends the category as the last child of its new parent and
    /// re-numbers the old parent's remaining children inside the same store
    /// transaction.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the category does not exist
    /// - [`AppError::Validation`] on a self-parent or cyclic assignment, or
    ///   when the new parent does not exist
    pub async fn update(&self, id: i64, changes: CategoryUpdate) -> Result<Category, AppError> {
        let current = self
            .repo
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found", json!({ "id": id })))?;

        let mut patch = CategoryPatch {
            description: changes.description,
            is_active: changes.is_active,
            ..Default::default()
        };

        if let Some(name) = changes.name
            && name != current.name
        {
            patch.slug = Some(self.generate_slug(&name, Some(&current.slug)).await?);
            patch.name = Some(name);
        }

        let new_parent = match changes.parent_id {
            Some(requested) if requested != current.parent_id => Some(requested),
            _ => None,
        };

        let updated = match new_parent {
            Some(new_parent_id) => {
                if new_parent_id == Some(id) {
                    return Err(AppError::bad_request(
                        "Category cannot be its own parent",
                        json!({ "id": id }),
                    ));
                }
                if let Some(pid) = new_parent_id {
                    self.ensure_parent_exists(pid).await?;
                    self.ensure_no_cycle(id, pid).await?;
                }

                let moved = self
                    .repo
                    .move_to_parent(id, current.parent_id, new_parent_id, patch)
                    .await?;

                self.cache
                    .invalidate_category_write(
                        Some(id),
                        Some(&current.slug),
                        &[current.parent_id, new_parent_id],
                    )
                    .await;

                moved
            }
            None => {
                if patch.is_empty() {
                    return Ok(current);
                }

                let updated = self.repo.update_fields(id, patch).await?;

                self.cache
                    .invalidate_category_write(
                        Some(id),
                        Some(&current.slug),
                        &[current.parent_id],
                    )
                    .await;

                updated
            }
        };

        Ok(updated)
    }

    /// Deletes a category. Its direct children become roots, appended after
    /// the existing roots; the former siblings are re-numbered to close the
    /// gap.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the category does not exist.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let current = self
            .repo
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found", json!({ "id": id })))?;

        self.repo.delete(id).await?;

        // The root sibling set changed too: the children were re-parented.
        self.cache
            .invalidate_category_write(Some(id), Some(&current.slug), &[current.parent_id, None])
            .await;

        Ok(())
    }

    // ── Course associations ─────────────────────────────────────────────────

    /// Associates a course with every category in `category_ids`.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] when any category id does not exist (nothing
    ///   is mutated in that case)
    /// - [`AppError::Conflict`] when an association already exists
    pub async fn associate(&self, course_id: i64, category_ids: &[i64]) -> Result<(), AppError> {
        self.ensure_categories_exist(category_ids).await?;

        for &category_id in category_ids {
            self.repo.link_course(course_id, category_id).await?;
        }

        self.cache
            .invalidate_course_links(course_id, category_ids)
            .await;

        Ok(())
    }

    /// Removes the associations between a course and every category in
    /// `category_ids`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when any category id does not exist.
    pub async fn disassociate(&self, course_id: i64, category_ids: &[i64]) -> Result<(), AppError> {
        self.ensure_categories_exist(category_ids).await?;

        for &category_id in category_ids {
            self.repo.unlink_course(course_id, category_id).await?;
        }

        self.cache
            .invalidate_course_links(course_id, category_ids)
            .await;

        Ok(())
    }

    /// Replaces a course's category set with `category_ids`: stale links are
    /// removed, missing ones added, and the union of old and new categories
    /// is invalidated in one batched call.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when any requested category id does not
    /// exist (nothing is mutated in that case).
    pub async fn replace_associations(
        &self,
        course_id: i64,
        category_ids: &[i64],
    ) -> Result<(), AppError> {
        self.ensure_categories_exist(category_ids).await?;

        let current = self.repo.category_ids_for_course(course_id).await?;
        let current_set: HashSet<i64> = current.iter().copied().collect();
        let requested_set: HashSet<i64> = category_ids.iter().copied().collect();

        for &category_id in &current {
            if !requested_set.contains(&category_id) {
                self.repo.unlink_course(course_id, category_id).await?;
            }
        }

        let mut seen = HashSet::new();
        for &category_id in category_ids {
            if seen.insert(category_id) && !current_set.contains(&category_id) {
                self.repo.link_course(course_id, category_id).await?;
            }
        }

        let affected: Vec<i64> = current_set.union(&requested_set).copied().collect();
        self.cache
            .invalidate_course_links(course_id, &affected)
            .await;

        Ok(())
    }

    /// Categories associated with one course, cache-aside.
    pub async fn get_categories_for_course(
        &self,
        course_id: i64,
    ) -> Result<Vec<Category>, AppError> {
        let key = keys::categories_for_course_key(course_id);
        if let Some(hit) = self.cache.get_json::<Vec<Category>>(&key).await {
            return Ok(hit);
        }

        let categories = self.repo.categories_for_course(course_id).await?;

        self.cache
            .set_json(&key, &categories, self.cache.list_ttl())
            .await;

        Ok(categories)
    }

    /// Paginated course ids for one category, cache-aside. With
    /// `include_subcategories` the query widens to every descendant category.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the category does not exist.
    pub async fn get_courses_for_category(
        &self,
        category_id: i64,
        page: u32,
        limit: u32,
        include_subcategories: bool,
    ) -> Result<Page<i64>, AppError> {
        self.get(category_id).await?;

        let key = keys::courses_for_category_key(category_id, page, limit, include_subcategories);
        if let Some(hit) = self.cache.get_json::<Page<i64>>(&key).await {
            return Ok(hit);
        }

        let mut scope = vec![category_id];
        if include_subcategories {
            scope.extend(self.descendant_ids(category_id).await?);
        }

        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let items = self
            .repo
            .course_ids_for_categories(&scope, i64::from(limit), offset)
            .await?;
        let total = self.repo.count_courses_for_categories(&scope).await?;

        let result = Page { items, total };
        self.cache
            .set_json(&key, &result, self.cache.list_ttl())
            .await;

        Ok(result)
    }

    /// Per-category course counts, cache-aside.
    pub async fn course_counts(&self) -> Result<Vec<CategoryCourseCount>, AppError> {
        let key = keys::course_counts_key();
        if let Some(hit) = self.cache.get_json::<Vec<CategoryCourseCount>>(&key).await {
            return Ok(hit);
        }

        let counts = self.repo.course_counts().await?;

        self.cache
            .set_json(&key, &counts, self.cache.list_ttl())
            .await;

        Ok(counts)
    }

    /// Preloads the hierarchy variants and the aggregate course counts.
    ///
    /// Run at startup when configured, or on demand via the cache admin
    /// endpoint.
    pub async fn warm_cache(&self) -> Result<(), AppError> {
        self.get_hierarchy(true).await?;
        self.get_hierarchy(false).await?;
        self.course_counts().await?;

        tracing::info!("Category cache warmed");

        Ok(())
    }

    // ── Internal helpers ────────────────────────────────────────────────────

    /// Derives a unique slug for `name`, ignoring `exclude` (the caller's own
    /// current slug during a rename).
    async fn generate_slug(&self, name: &str, exclude: Option<&str>) -> Result<String, AppError> {
        let mut existing: HashSet<String> = self.repo.all_slugs().await?.into_iter().collect();
        if let Some(own) = exclude {
            existing.remove(own);
        }

        Ok(uniquify(&slugify(name), &existing))
    }

    async fn ensure_parent_exists(&self, parent_id: i64) -> Result<(), AppError> {
        if self.repo.get(parent_id).await?.is_none() {
            return Err(AppError::bad_request(
                "Parent category not found",
                json!({ "parent_id": parent_id }),
            ));
        }

        Ok(())
    }

    /// Walks `parent_id` pointers upward from `candidate_parent`.
    ///
    /// Fails if the walk reaches the category being edited or revisits any
    /// node. The visited set bounds the walk even if the stored tree is
    /// already corrupt.
    async fn ensure_no_cycle(&self, id: i64, candidate_parent: i64) -> Result<(), AppError> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent);

        while let Some(current) = cursor {
            if current == id || !visited.insert(current) {
                return Err(AppError::bad_request(
                    "Moving the category under this parent would create a cycle",
                    json!({ "id": id, "parent_id": candidate_parent }),
                ));
            }

            cursor = self.repo.get(current).await?.and_then(|c| c.parent_id);
        }

        Ok(())
    }

    /// All descendant ids of `root`, breadth-first. The visited set guards
    /// against revisits on a corrupt tree.
    async fn descendant_ids(&self, root: i64) -> Result<Vec<i64>, AppError> {
        let mut result = Vec::new();
        let mut visited = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            for child in self.repo.children_of(Some(current)).await? {
                if visited.insert(child.id) {
                    result.push(child.id);
                    queue.push_back(child.id);
                }
            }
        }

        Ok(result)
    }

    async fn ensure_categories_exist(&self, category_ids: &[i64]) -> Result<(), AppError> {
        let mut missing = Vec::new();
        for &category_id in category_ids {
            if self.repo.get(category_id).await?.is_none() {
                missing.push(category_id);
            }
        }

        if !missing.is_empty() {
            return Err(AppError::not_found(
                "Unknown category ids",
                json!({ "category_ids": missing }),
            ));
        }

        Ok(())
    }
}
