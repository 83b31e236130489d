//! Handlers for cache diagnostics and administration endpoints.

use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;
use crate::infrastructure::cache::CacheStats;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CacheHealthResponse {
    pub healthy: bool,
}

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub deleted: u64,
}

/// Reports key count and backend status.
///
/// # Endpoint
///
/// `GET /api/cache/stats`
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats().await)
}

/// Pings the cache backend.
///
/// # Endpoint
///
/// `GET /api/cache/health`
pub async fn cache_health_handler(State(state): State<AppState>) -> Json<CacheHealthResponse> {
    Json(CacheHealthResponse {
        healthy: state.cache.healthy().await,
    })
}

/// Purges every cached category entry.
///
/// Safe at any time: the cache is never a source of truth, so a full purge
/// costs only cache misses.
///
/// # Endpoint
///
/// `POST /api/cache/clear`
pub async fn cache_clear_handler(State(state): State<AppState>) -> Json<CacheClearResponse> {
    Json(CacheClearResponse {
        deleted: state.cache.clear_all().await,
    })
}

/// Runs the cache warm-up pass (hierarchy variants + course counts).
///
/// # Endpoint
///
/// `POST /api/cache/warm`
pub async fn cache_warm_handler(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.category_service.warm_cache().await?;

    Ok(Json(json!({ "status": "warmed" })))
}

/// Runs a set/get/delete round trip against the cache backend.
///
/// # Endpoint
///
/// `GET /api/cache/test`
///
/// # Errors
///
/// Returns 500 Internal Server Error when the written value does not read
/// back (backend unreachable or caching disabled).
pub async fn cache_test_handler(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.cache.probe().await {
        return Err(AppError::internal("Cache probe failed", json!({})));
    }

    Ok(Json(json!({ "status": "ok" })))
}
