//! DTOs for category endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use validator::Validate;

use crate::domain::entities::Category;

/// Request to create a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    /// Accepts a number, a numeric string, `null`, or `""` (treated as null).
    #[serde(default, deserialize_with = "lenient_optional_id")]
    pub parent_id: Option<i64>,

    /// Defaults to `true`.
    pub is_active: Option<bool>,
}

/// Request to partially update a category.
///
/// All fields are optional. `parent_id` distinguishes "absent" (keep the
/// current parent) from an explicit `null` or `""` (move to the root level).
/// `description: null` clears the description.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "lenient_double_option_id")]
    pub parent_id: Option<Option<i64>>,

    pub is_active: Option<bool>,
}

/// JSON representation of a category.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            parent_id: category.parent_id,
            is_active: category.is_active,
            display_order: category.display_order,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// Paginated category listing.
#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub items: Vec<CategoryResponse>,
    pub total: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrText {
    Id(i64),
    Text(String),
}

/// Parses an optional id that clients may send as a number, a numeric
/// string, `null`, or an empty string (normalized to `None`).
fn lenient_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IdOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IdOrText::Id(id)) => Ok(Some(id)),
        Some(IdOrText::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed
                    .parse()
                    .map(Some)
                    .map_err(|_| de::Error::custom(format!("invalid id: {text:?}")))
            }
        }
    }
}

/// Like [`lenient_optional_id`], but only invoked when the field is present,
/// so an absent field stays `None` while an explicit `null` becomes
/// `Some(None)`.
fn lenient_double_option_id<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_optional_id(deserializer).map(Some)
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::deserialize(deserializer).map(Some)
}
