//! Handlers for category CRUD, listing, and hierarchy endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::category::{
    CategoryListResponse, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::api::dto::pagination::{CategoryCoursesQuery, HierarchyQuery, ListCategoriesQuery};
use crate::application::services::{CategoryUpdate, Page};
use crate::domain::entities::CategoryNode;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a category.
///
/// # Endpoint
///
/// `POST /api/categories`
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Web Development",
///   "description": "Frontend and backend courses",  // optional
///   "parent_id": 3,                                  // optional, "" and null mean root
///   "is_active": true                                // optional, default true
/// }
/// ```
///
/// The new category is appended as the last sibling under its parent.
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails or `parent_id` does not
/// resolve to an existing category.
pub async fn create_category_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    payload.validate()?;

    let category = state
        .category_service
        .create(
            payload.name,
            payload.description,
            payload.parent_id,
            payload.is_active.unwrap_or(true),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// Lists categories with pagination and optional parent/activity filters.
///
/// # Endpoint
///
/// `GET /api/categories?page=1&limit=20&parent_id=root&is_active=true`
pub async fn list_categories_handler(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<CategoryListResponse>, AppError> {
    let (page, limit) = query
        .pagination
        .validate_and_get()
        .map_err(|reason| AppError::bad_request(reason, json!({})))?;
    let parent_filter = query
        .parent_filter()
        .map_err(|reason| AppError::bad_request(reason, json!({})))?;

    let result = state
        .category_service
        .list(page, limit, parent_filter, query.is_active)
        .await?;

    Ok(Json(CategoryListResponse {
        items: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
    }))
}

/// Returns the assembled category tree.
///
/// # Endpoint
///
/// `GET /api/categories/hierarchy?active_only=true`
pub async fn hierarchy_handler(
    State(state): State<AppState>,
    Query(query): Query<HierarchyQuery>,
) -> Result<Json<Vec<CategoryNode>>, AppError> {
    let forest = state
        .category_service
        .get_hierarchy(query.active_only.unwrap_or(false))
        .await?;

    Ok(Json(forest))
}

/// Fetches a category by id.
///
/// # Endpoint
///
/// `GET /api/categories/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the category doesn't exist.
pub async fn get_category_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<CategoryResponse>, AppError> {
    let category = state.category_service.get(id).await?;

    Ok(Json(category.into()))
}

/// Fetches a category by slug.
///
/// # Endpoint
///
/// `GET /api/categories/slug/{slug}`
///
/// # Errors
///
/// Returns 404 Not Found if the category doesn't exist.
pub async fn get_category_by_slug_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CategoryResponse>, AppError> {
    let category = state.category_service.get_by_slug(&slug).await?;

    Ok(Json(category.into()))
}

/// Partially updates a category.
///
/// # Endpoint
///
/// `PATCH /api/categories/{id}`
///
/// # Request Body
///
/// All fields are optional. Only provided fields are changed.
///
/// ```json
/// {
///   "name": "New name",       // regenerates the slug when it differs
///   "description": null,      // null clears the description
///   "parent_id": 7,           // null or "" moves to root; absent keeps parent
///   "is_active": false
/// }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the category doesn't exist.
/// Returns 400 Bad Request on a self-parent or cyclic assignment, or when the
/// new parent doesn't exist.
pub async fn update_category_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    payload.validate()?;

    let changes = CategoryUpdate {
        name: payload.name,
        description: payload.description,
        parent_id: payload.parent_id,
        is_active: payload.is_active,
    };

    let category = state.category_service.update(id, changes).await?;

    Ok(Json(category.into()))
}

/// Deletes a category.
///
/// # Endpoint
///
/// `DELETE /api/categories/{id}`
///
/// # Behavior
///
/// Direct children are re-parented to the root level (they are not deleted);
/// the remaining siblings keep a contiguous ordering.
///
/// # Errors
///
/// Returns 404 Not Found if the category doesn't exist.
pub async fn delete_category_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.category_service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists the course ids attached to a category.
///
/// # Endpoint
///
/// `GET /api/categories/{id}/courses?page=1&limit=20&include_subcategories=true`
///
/// With `include_subcategories=true` the listing covers every descendant
/// category as well.
///
/// # Errors
///
/// Returns 404 Not Found if the category doesn't exist.
pub async fn courses_for_category_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Query(query): Query<CategoryCoursesQuery>,
) -> Result<Json<Page<i64>>, AppError> {
    let (page, limit) = query
        .pagination
        .validate_and_get()
        .map_err(|reason| AppError::bad_request(reason, json!({})))?;

    let result = state
        .category_service
        .get_courses_for_category(id, page, limit, query.include_subcategories.unwrap_or(false))
        .await?;

    Ok(Json(result))
}
