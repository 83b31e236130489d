//! Cache-aside layer over category data.
//!
//! A [`KeyValueCache`] trait abstracts the key-value backend:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`NullCache`] - No-op implementation for testing/disabled caching
//!
//! [`CacheLayer`] adds JSON typing, the category key catalog ([`keys`]), and
//! the invalidation entry points used after committed writes. The cache is
//! never a source of truth: every error degrades to a miss.

pub mod keys;
mod layer;
mod null_cache;
mod redis_cache;
mod service;

pub use layer::{CacheLayer, CacheStats};
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, KeyValueCache};
