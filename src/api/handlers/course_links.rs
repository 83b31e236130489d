//! Handlers for course-category association endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::api::dto::category::CategoryResponse;
use crate::api::dto::course_links::{CourseCategoriesRequest, CourseCategoriesResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Lists the categories a course belongs to.
///
/// # Endpoint
///
/// `GET /api/courses/{course_id}/categories`
pub async fn get_course_categories_handler(
    Path(course_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = state
        .category_service
        .get_categories_for_course(course_id)
        .await?;

    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// Associates a course with one or more categories.
///
/// # Endpoint
///
/// `POST /api/courses/{course_id}/categories`
///
/// # Errors
///
/// Returns 400 Bad Request when `category_ids` is empty, 404 Not Found when
/// any id is unknown (nothing is mutated), and 409 Conflict when an
/// association already exists.
pub async fn associate_courses_handler(
    Path(course_id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<CourseCategoriesRequest>,
) -> Result<Json<CourseCategoriesResponse>, AppError> {
    payload.validate()?;

    state
        .category_service
        .associate(course_id, &payload.category_ids)
        .await?;

    Ok(Json(CourseCategoriesResponse {
        course_id,
        category_ids: payload.category_ids,
    }))
}

/// Removes the association between a course and one or more categories.
///
/// # Endpoint
///
/// `DELETE /api/courses/{course_id}/categories`
///
/// # Errors
///
/// Returns 400 Bad Request when `category_ids` is empty and 404 Not Found
/// when any id is unknown.
pub async fn disassociate_courses_handler(
    Path(course_id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<CourseCategoriesRequest>,
) -> Result<Json<CourseCategoriesResponse>, AppError> {
    payload.validate()?;

    state
        .category_service
        .disassociate(course_id, &payload.category_ids)
        .await?;

    Ok(Json(CourseCategoriesResponse {
        course_id,
        category_ids: payload.category_ids,
    }))
}

/// Replaces a course's category set.
///
/// # Endpoint
///
/// `PUT /api/courses/{course_id}/categories`
///
/// Stale associations are removed, missing ones added; categories untouched
/// by the diff keep their existing links.
///
/// # Errors
///
/// Returns 400 Bad Request when `category_ids` is empty and 404 Not Found
/// when any id is unknown (nothing is mutated).
pub async fn replace_course_categories_handler(
    Path(course_id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<CourseCategoriesRequest>,
) -> Result<Json<CourseCategoriesResponse>, AppError> {
    payload.validate()?;

    state
        .category_service
        .replace_associations(course_id, &payload.category_ids)
        .await?;

    Ok(Json(CourseCategoriesResponse {
        course_id,
        category_ids: payload.category_ids,
    }))
}
