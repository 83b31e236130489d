//! Key-value cache trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
    #[error("Cache operation error: {0}")]
    Operation(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for the key-value backend behind the category cache.
///
/// Implementations must be thread-safe and handle errors gracefully without
/// disrupting the application: a failed read is a miss, a failed write or
/// delete is a no-op. Errors are logged inside the implementation and never
/// reach business code.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Backend name for diagnostics ("redis" or "null").
    fn name(&self) -> &'static str;

    /// Retrieves a raw value.
    ///
    /// Returns `Ok(Some(value))` on hit, `Ok(None)` on miss or error
    /// (fail-open behavior).
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores a raw value with a TTL in seconds.
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()>;

    /// Removes a single key.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Removes every key matching a glob-style pattern. Returns the number of
    /// keys deleted.
    async fn delete_by_pattern(&self, pattern: &str) -> CacheResult<u64>;

    /// Lists keys matching a glob-style pattern.
    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;

    /// Checks if the cache backend is reachable.
    async fn ping(&self) -> bool;
}
