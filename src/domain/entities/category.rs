//! Category entity and the derived hierarchy view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A category row from the self-referential category tree.
///
/// `parent_id = None` marks a root. The tree itself is never persisted as a
/// nested structure; it is rebuilt from the flat rows on demand
/// (see [`CategoryNode::build_forest`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub is_active: bool,
    /// Zero-based contiguous rank among siblings sharing the same `parent_id`.
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Returns true if the category is a root (has no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Input data for inserting a new category row.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub is_active: bool,
    pub display_order: i32,
}

/// Partial update for an existing category.
///
/// `None` fields are left unchanged.
/// `description: Some(None)` clears the description; `Some(Some(text))` sets it.
/// `name` and `slug` travel together: the service regenerates the slug
/// whenever the name actually changes.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl CategoryPatch {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
    }
}

/// Per-category course count from the aggregate query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryCourseCount {
    pub category_id: i64,
    pub course_count: i64,
}

/// A category with its children attached, as served by the hierarchy endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Assembles the forest from a flat list of rows.
    ///
    /// Builds a parent → children map in one pass, then attaches children
    /// recursively starting from the roots. Siblings are ordered by
    /// `display_order`. Rows whose parent is absent from the input (e.g. the
    /// parent was filtered out as inactive) are not reachable from any root
    /// and are omitted.
    pub fn build_forest(categories: Vec<Category>) -> Vec<CategoryNode> {
        let mut children_map: HashMap<Option<i64>, Vec<Category>> = HashMap::new();
        for category in categories {
            children_map
                .entry(category.parent_id)
                .or_default()
                .push(category);
        }
        for bucket in children_map.values_mut() {
            bucket.sort_by_key(|c| c.display_order);
        }

        let roots = children_map.remove(&None).unwrap_or_default();
        roots
            .into_iter()
            .map(|root| Self::attach(root, &mut children_map))
            .collect()
    }

    fn attach(category: Category, children_map: &mut HashMap<Option<i64>, Vec<Category>>) -> Self {
        let children = children_map
            .remove(&Some(category.id))
            .unwrap_or_default()
            .into_iter()
            .map(|child| Self::attach(child, children_map))
            .collect();

        CategoryNode { category, children }
    }
}
