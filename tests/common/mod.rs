#![allow(dead_code)]

//! Shared test fixtures: in-memory implementations of the repository and
//! cache traits, so service and handler behavior (including cache-aside
//! invalidation) can be exercised without PostgreSQL or Redis.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use course_categories::application::services::CategoryService;
use course_categories::domain::entities::{
    Category, CategoryCourseCount, CategoryPatch, NewCategory,
};
use course_categories::domain::repositories::{CategoryFilter, CategoryRepository};
use course_categories::error::AppError;
use course_categories::infrastructure::cache::{CacheLayer, CacheResult, KeyValueCache};
use course_categories::state::AppState;

#[derive(Default)]
struct RepoInner {
    next_id: i64,
    rows: BTreeMap<i64, Category>,
    links: BTreeSet<(i64, i64)>,
}

/// In-memory [`CategoryRepository`] mirroring the PostgreSQL implementation's
/// semantics. Each mutation runs under one mutex lock, which stands in for
/// the store transaction: concurrent mutations serialize, none is observable
/// half-applied.
#[derive(Default)]
pub struct InMemoryCategoryRepository {
    inner: Mutex<RepoInner>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored row, for invariant assertions.
    pub fn snapshot(&self) -> Vec<Category> {
        self.inner.lock().unwrap().rows.values().cloned().collect()
    }

    fn apply_patch(row: &mut Category, patch: &CategoryPatch) {
        if let Some(name) = &patch.name {
            row.name = name.clone();
        }
        if let Some(slug) = &patch.slug {
            row.slug = slug.clone();
        }
        if let Some(description) = &patch.description {
            row.description = description.clone();
        }
        if let Some(is_active) = patch.is_active {
            row.is_active = is_active;
        }
        row.updated_at = Utc::now();
    }

    fn children_sorted(inner: &RepoInner, parent_id: Option<i64>) -> Vec<i64> {
        let mut children: Vec<&Category> = inner
            .rows
            .values()
            .filter(|c| c.parent_id == parent_id)
            .collect();
        children.sort_by_key(|c| (c.display_order, c.id));
        children.into_iter().map(|c| c.id).collect()
    }

    fn next_order(inner: &RepoInner, parent_id: Option<i64>) -> i32 {
        inner
            .rows
            .values()
            .filter(|c| c.parent_id == parent_id)
            .map(|c| c.display_order + 1)
            .max()
            .unwrap_or(0)
    }

    fn reindex(inner: &mut RepoInner, parent_id: Option<i64>) {
        for (rank, id) in Self::children_sorted(inner, parent_id).into_iter().enumerate() {
            let row = inner.rows.get_mut(&id).unwrap();
            if row.display_order != rank as i32 {
                row.display_order = rank as i32;
                row.updated_at = Utc::now();
            }
        }
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found("Category not found", json!({ "id": id }))
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn get(&self, id: i64) -> Result<Option<Category>, AppError> {
        Ok(self.inner.lock().unwrap().rows.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .rows
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
        filter: CategoryFilter,
    ) -> Result<Vec<Category>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut matching: Vec<Category> = inner
            .rows
            .values()
            .filter(|c| filter.is_active.is_none_or(|active| c.is_active == active))
            .filter(|c| filter.parent_id.is_none_or(|parent| c.parent_id == parent))
            .cloned()
            .collect();
        matching.sort_by_key(|c| (c.parent_id.is_some(), c.parent_id, c.display_order));

        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, filter: CategoryFilter) -> Result<i64, AppError> {
        let inner = self.inner.lock().unwrap();
        let count = inner
            .rows
            .values()
            .filter(|c| filter.is_active.is_none_or(|active| c.is_active == active))
            .filter(|c| filter.parent_id.is_none_or(|parent| c.parent_id == parent))
            .count();

        Ok(count as i64)
    }

    async fn children_of(&self, parent_id: Option<i64>) -> Result<Vec<Category>, AppError> {
        let inner = self.inner.lock().unwrap();
        let ids = Self::children_sorted(&inner, parent_id);

        Ok(ids.into_iter().map(|id| inner.rows[&id].clone()).collect())
    }

    async fn all(&self, active_only: bool) -> Result<Vec<Category>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Category> = inner
            .rows
            .values()
            .filter(|c| !active_only || c.is_active)
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.parent_id.is_some(), c.parent_id, c.display_order));

        Ok(rows)
    }

    async fn all_slugs(&self) -> Result<Vec<String>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .rows
            .values()
            .map(|c| c.slug.clone())
            .collect())
    }

    async fn next_display_order(&self, parent_id: Option<i64>) -> Result<i32, AppError> {
        Ok(Self::next_order(&self.inner.lock().unwrap(), parent_id))
    }

    async fn create(&self, new: NewCategory) -> Result<Category, AppError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.rows.values().any(|c| c.slug == new.slug) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "categories_slug_key" }),
            ));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();
        let row = Category {
            id,
            name: new.name,
            slug: new.slug,
            description: new.description,
            parent_id: new.parent_id,
            is_active: new.is_active,
            display_order: new.display_order,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(id, row.clone());

        Ok(row)
    }

    async fn update_fields(&self, id: i64, patch: CategoryPatch) -> Result<Category, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let row = inner.rows.get_mut(&id).ok_or_else(|| not_found(id))?;

        Self::apply_patch(row, &patch);

        Ok(row.clone())
    }

    async fn move_to_parent(
        &self,
        id: i64,
        old_parent_id: Option<i64>,
        new_parent_id: Option<i64>,
        patch: CategoryPatch,
    ) -> Result<Category, AppError> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.rows.contains_key(&id) {
            return Err(not_found(id));
        }

        let display_order = Self::next_order(&inner, new_parent_id);
        let row = inner.rows.get_mut(&id).unwrap();
        row.parent_id = new_parent_id;
        row.display_order = display_order;
        Self::apply_patch(row, &patch);

        Self::reindex(&mut inner, old_parent_id);

        Ok(inner.rows[&id].clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();

        let Some(target) = inner.rows.get(&id).cloned() else {
            return Err(not_found(id));
        };

        // Children become roots, appended after the existing ones.
        let base = Self::next_order(&inner, None);
        for (rank, child_id) in Self::children_sorted(&inner, Some(id))
            .into_iter()
            .enumerate()
        {
            let child = inner.rows.get_mut(&child_id).unwrap();
            child.parent_id = None;
            child.display_order = base + rank as i32;
            child.updated_at = Utc::now();
        }

        inner.rows.remove(&id);
        inner.links.retain(|&(_, category_id)| category_id != id);

        for row in inner.rows.values_mut() {
            if row.parent_id == target.parent_id && row.display_order > target.display_order {
                row.display_order -= 1;
                row.updated_at = Utc::now();
            }
        }

        Ok(())
    }

    async fn reindex_siblings(&self, parent_id: Option<i64>) -> Result<(), AppError> {
        Self::reindex(&mut self.inner.lock().unwrap(), parent_id);

        Ok(())
    }

    async fn link_course(&self, course_id: i64, category_id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.links.insert((course_id, category_id)) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "course_categories_pkey" }),
            ));
        }

        Ok(())
    }

    async fn unlink_course(&self, course_id: i64, category_id: i64) -> Result<(), AppError> {
        self.inner
            .lock()
            .unwrap()
            .links
            .remove(&(course_id, category_id));

        Ok(())
    }

    async fn category_ids_for_course(&self, course_id: i64) -> Result<Vec<i64>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .links
            .iter()
            .filter(|&&(course, _)| course == course_id)
            .map(|&(_, category_id)| category_id)
            .collect())
    }

    async fn categories_for_course(&self, course_id: i64) -> Result<Vec<Category>, AppError> {
        let inner = self.inner.lock().unwrap();

        Ok(inner
            .links
            .iter()
            .filter(|&&(course, _)| course == course_id)
            .filter_map(|&(_, category_id)| inner.rows.get(&category_id).cloned())
            .collect())
    }

    async fn course_ids_for_categories(
        &self,
        category_ids: &[i64],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<i64>, AppError> {
        let inner = self.inner.lock().unwrap();
        let distinct: BTreeSet<i64> = inner
            .links
            .iter()
            .filter(|&&(_, category_id)| category_ids.contains(&category_id))
            .map(|&(course_id, _)| course_id)
            .collect();

        Ok(distinct
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_courses_for_categories(&self, category_ids: &[i64]) -> Result<i64, AppError> {
        let inner = self.inner.lock().unwrap();
        let distinct: BTreeSet<i64> = inner
            .links
            .iter()
            .filter(|&&(_, category_id)| category_ids.contains(&category_id))
            .map(|&(course_id, _)| course_id)
            .collect();

        Ok(distinct.len() as i64)
    }

    async fn course_counts(&self) -> Result<Vec<CategoryCourseCount>, AppError> {
        let inner = self.inner.lock().unwrap();

        Ok(inner
            .rows
            .keys()
            .map(|&category_id| CategoryCourseCount {
                category_id,
                course_count: inner
                    .links
                    .iter()
                    .filter(|&&(_, cat)| cat == category_id)
                    .count() as i64,
            })
            .collect())
    }
}

/// In-memory [`KeyValueCache`] with glob-suffix pattern support, enough to
/// observe cache hits, misses, and invalidation.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn matches(pattern: &str, key: &str) -> bool {
        match pattern.split_once('*') {
            None => pattern == key,
            Some((prefix, "")) => key.starts_with(prefix),
            Some((prefix, suffix)) => key.starts_with(prefix) && key.ends_with(suffix),
        }
    }
}

#[async_trait]
impl KeyValueCache for InMemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl_seconds: u64) -> CacheResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().unwrap().remove(key);

        Ok(())
    }

    async fn delete_by_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|key, _| !Self::matches(pattern, key));

        Ok((before - entries.len()) as u64)
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .keys()
            .filter(|key| Self::matches(pattern, key))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> bool {
        true
    }
}

/// Builds a service wired to fresh in-memory backends.
pub fn create_test_service() -> (
    Arc<CategoryService>,
    Arc<InMemoryCategoryRepository>,
    Arc<InMemoryCache>,
) {
    let repo = Arc::new(InMemoryCategoryRepository::new());
    let cache_backend = Arc::new(InMemoryCache::new());
    let cache = CacheLayer::new(cache_backend.clone(), 3600, 1800);
    let service = Arc::new(CategoryService::new(repo.clone(), cache));

    (service, repo, cache_backend)
}

/// Builds an [`AppState`] over in-memory backends. The pool is lazy and never
/// connected; only the health endpoint would touch it.
pub fn create_test_state() -> (
    AppState,
    Arc<InMemoryCategoryRepository>,
    Arc<InMemoryCache>,
) {
    let repo = Arc::new(InMemoryCategoryRepository::new());
    let cache_backend = Arc::new(InMemoryCache::new());
    let cache = CacheLayer::new(cache_backend.clone(), 3600, 1800);
    let service = Arc::new(CategoryService::new(repo.clone(), cache.clone()));

    let db = PgPool::connect_lazy("postgres://postgres@localhost:5432/unused")
        .expect("lazy pool from static url");

    let state = AppState {
        category_service: service,
        cache,
        db,
    };

    (state, repo, cache_backend)
}

/// Asserts that every sibling set (including the roots) is numbered exactly
/// `0..n-1`.
pub fn assert_contiguous_orders(repo: &InMemoryCategoryRepository) {
    let rows = repo.snapshot();
    let mut by_parent: BTreeMap<Option<i64>, Vec<i32>> = BTreeMap::new();
    for row in &rows {
        by_parent.entry(row.parent_id).or_default().push(row.display_order);
    }

    for (parent, mut orders) in by_parent {
        orders.sort_unstable();
        let expected: Vec<i32> = (0..orders.len() as i32).collect();
        assert_eq!(
            orders, expected,
            "display_order not contiguous under parent {parent:?}"
        );
    }
}

/// Asserts that no parent walk from any node ever revisits that node.
pub fn assert_acyclic(repo: &InMemoryCategoryRepository) {
    let rows = repo.snapshot();
    let parents: BTreeMap<i64, Option<i64>> =
        rows.iter().map(|c| (c.id, c.parent_id)).collect();

    for row in &rows {
        let mut seen = BTreeSet::from([row.id]);
        let mut cursor = row.parent_id;
        while let Some(current) = cursor {
            assert!(
                seen.insert(current),
                "cycle detected walking up from category {}",
                row.id
            );
            cursor = parents.get(&current).copied().flatten();
        }
    }
}
