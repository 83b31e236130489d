//! Cache-key catalog for category data.
//!
//! Every key lives under the `category:` namespace so a single pattern can
//! purge the whole subsystem. List and per-category course keys carry enough
//! parameters (page, limit, filters) that they are invalidated by pattern;
//! point lookups (by id, by slug) are deleted precisely.
//!
//! Keys are produced by these functions only. Handlers and services never
//! concatenate key strings themselves.

/// Namespace prefix shared by every category cache entry.
pub const NAMESPACE: &str = "category";

/// Point lookup by category id.
pub fn id_key(id: i64) -> String {
    format!("{NAMESPACE}:id:{id}")
}

/// Point lookup by slug.
pub fn slug_key(slug: &str) -> String {
    format!("{NAMESPACE}:slug:{slug}")
}

/// Paginated list, keyed by the full parameter combination.
///
/// `parent_id: Some(None)` means "roots only", `Some(Some(id))` means
/// "children of id", `None` means no parent filter.
pub fn list_key(
    page: u32,
    limit: u32,
    parent_id: Option<Option<i64>>,
    is_active: Option<bool>,
) -> String {
    let parent = match parent_id {
        None => "any".to_string(),
        Some(None) => "root".to_string(),
        Some(Some(id)) => id.to_string(),
    };
    let active = match is_active {
        None => "any",
        Some(true) => "1",
        Some(false) => "0",
    };
    format!("{NAMESPACE}:list:page:{page}:limit:{limit}:parent:{parent}:active:{active}")
}

/// Pattern covering every paginated list entry.
pub fn list_pattern() -> String {
    format!("{NAMESPACE}:list:*")
}

/// Assembled hierarchy tree, keyed by the active-only flag.
pub fn hierarchy_key(active_only: bool) -> String {
    let scope = if active_only { "active" } else { "full" };
    format!("{NAMESPACE}:hierarchy:{scope}")
}

/// Pattern covering both hierarchy variants.
pub fn hierarchy_pattern() -> String {
    format!("{NAMESPACE}:hierarchy:*")
}

/// Aggregate per-category course counts.
pub fn course_counts_key() -> String {
    format!("{NAMESPACE}:course-counts")
}

/// Category ids associated with one course.
pub fn categories_for_course_key(course_id: i64) -> String {
    format!("{NAMESPACE}:for-course:{course_id}")
}

/// Paginated course ids for one category, keyed by pagination and the
/// include-subcategories flag.
pub fn courses_for_category_key(
    category_id: i64,
    page: u32,
    limit: u32,
    include_subcategories: bool,
) -> String {
    let subs = if include_subcategories { 1 } else { 0 };
    format!("{NAMESPACE}:courses:{category_id}:page:{page}:limit:{limit}:subs:{subs}")
}

/// Pattern covering every course listing of one category.
pub fn courses_for_category_pattern(category_id: i64) -> String {
    format!("{NAMESPACE}:courses:{category_id}:*")
}

/// Pattern covering the entire category namespace.
pub fn all_pattern() -> String {
    format!("{NAMESPACE}:*")
}
