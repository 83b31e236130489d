//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, warm-up, and Axum server
//! lifecycle.

use crate::application::services::CategoryService;
use crate::config::Config;
use crate::infrastructure::cache::{CacheLayer, KeyValueCache, NullCache, RedisCache};
use crate::infrastructure::persistence::PgCategoryRepository;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - Optional cache warm-up pass
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate");

    let backend: Arc<dyn KeyValueCache> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let cache = CacheLayer::new(
        backend,
        config.cache_point_ttl_seconds,
        config.cache_list_ttl_seconds,
    );

    let repository = Arc::new(PgCategoryRepository::new(Arc::new(pool.clone())));
    let category_service = Arc::new(CategoryService::new(repository, cache.clone()));

    if config.cache_warm_on_start {
        let warm_service = category_service.clone();
        tokio::spawn(async move {
            if let Err(e) = warm_service.warm_cache().await {
                tracing::warn!("Cache warm-up failed: {}", e);
            }
        });
    }

    let state = AppState {
        category_service,
        cache,
        db: pool,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}
