use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::CategoryService;
use crate::infrastructure::cache::CacheLayer;

/// Shared application state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub category_service: Arc<CategoryService>,
    pub cache: CacheLayer,
    pub db: PgPool,
}
