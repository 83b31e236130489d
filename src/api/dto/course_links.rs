//! DTOs for course-category association endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for associate / disassociate / replace operations.
#[derive(Debug, Deserialize, Validate)]
pub struct CourseCategoriesRequest {
    #[validate(length(min = 1, message = "category_ids must not be empty"))]
    pub category_ids: Vec<i64>,
}

/// Echo of the applied association change.
#[derive(Debug, Serialize)]
pub struct CourseCategoriesResponse {
    pub course_id: i64,
    pub category_ids: Vec<i64>,
}
