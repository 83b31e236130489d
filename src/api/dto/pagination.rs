//! Pagination and filtering query parameters.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

/// Pagination query parameters.
///
/// Uses `serde_with` to parse page numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// Validates pagination parameters.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `limit`: 20
    ///
    /// # Validation
    ///
    /// - Page must be > 0
    /// - Limit must be between 1 and 100
    ///
    /// # Returns
    ///
    /// `(page, limit)` tuple.
    pub fn validate_and_get(&self) -> Result<(u32, u32), String> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(20);

        if page == 0 {
            return Err("Page must be greater than 0".to_string());
        }

        if !(1..=100).contains(&limit) {
            return Err("Limit must be between 1 and 100".to_string());
        }

        Ok((page, limit))
    }
}

/// Query parameters for the category listing endpoint.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListCategoriesQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Absent = no parent filter; `"root"`, `"null"` or `""` = roots only;
    /// a number = children of that category.
    pub parent_id: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl ListCategoriesQuery {
    /// Interprets the raw `parent_id` query value.
    pub fn parent_filter(&self) -> Result<Option<Option<i64>>, String> {
        match self.parent_id.as_deref().map(str::trim) {
            None => Ok(None),
            Some("") | Some("null") | Some("root") => Ok(Some(None)),
            Some(raw) => raw
                .parse()
                .map(|id| Some(Some(id)))
                .map_err(|_| format!("Invalid parent_id: {raw:?}")),
        }
    }
}

/// Query parameters for the hierarchy endpoint.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct HierarchyQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub active_only: Option<bool>,
}

/// Query parameters for the courses-of-a-category endpoint.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct CategoryCoursesQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub include_subcategories: Option<bool>,
}
