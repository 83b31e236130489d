//! API route configuration.

use crate::api::handlers::{
    associate_courses_handler, cache_clear_handler, cache_health_handler, cache_stats_handler,
    cache_test_handler, cache_warm_handler, courses_for_category_handler,
    create_category_handler, delete_category_handler, disassociate_courses_handler,
    get_category_by_slug_handler, get_category_handler, get_course_categories_handler,
    hierarchy_handler, list_categories_handler, replace_course_categories_handler,
    update_category_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes.
///
/// # Endpoints
///
/// - `POST   /categories`                     - Create a category
/// - `GET    /categories`                     - Paginated listing with filters
/// - `GET    /categories/hierarchy`           - Assembled category tree
/// - `GET    /categories/slug/{slug}`         - Point lookup by slug
/// - `GET    /categories/{id}`                - Point lookup by id
/// - `PATCH  /categories/{id}`                - Partial update / move
/// - `DELETE /categories/{id}`                - Delete (children become roots)
/// - `GET    /categories/{id}/courses`        - Course ids of a category
/// - `GET    /courses/{course_id}/categories` - Categories of a course
/// - `POST   /courses/{course_id}/categories` - Associate
/// - `DELETE /courses/{course_id}/categories` - Disassociate
/// - `PUT    /courses/{course_id}/categories` - Replace the whole set
/// - `GET    /cache/stats`, `GET /cache/health`, `POST /cache/clear`,
///   `POST /cache/warm`, `GET /cache/test`    - Cache diagnostics
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            post(create_category_handler).get(list_categories_handler),
        )
        .route("/categories/hierarchy", get(hierarchy_handler))
        .route("/categories/slug/{slug}", get(get_category_by_slug_handler))
        .route(
            "/categories/{id}",
            get(get_category_handler)
                .patch(update_category_handler)
                .delete(delete_category_handler),
        )
        .route("/categories/{id}/courses", get(courses_for_category_handler))
        .route(
            "/courses/{course_id}/categories",
            get(get_course_categories_handler)
                .post(associate_courses_handler)
                .delete(disassociate_courses_handler)
                .put(replace_course_categories_handler),
        )
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/health", get(cache_health_handler))
        .route("/cache/clear", post(cache_clear_handler))
        .route("/cache/warm", post(cache_warm_handler))
        .route("/cache/test", get(cache_test_handler))
}
