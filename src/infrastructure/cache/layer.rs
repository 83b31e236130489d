//! Typed cache façade with the category invalidation entry points.

use super::keys;
use super::service::KeyValueCache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Diagnostic snapshot returned by the cache stats endpoint.
#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub backend: &'static str,
    pub keys: usize,
    pub healthy: bool,
}

/// Cache-aside façade over a [`KeyValueCache`] backend.
///
/// Adds JSON serialization, the two TTL classes (point lookups vs
/// lists/aggregates), and the invalidation entry points called by
/// [`crate::application::services::CategoryService`] after a committed write.
/// Holds no state of its own beyond the backend handle and TTLs; clearing the
/// backend at any time affects performance only, never correctness.
#[derive(Clone)]
pub struct CacheLayer {
    backend: Arc<dyn KeyValueCache>,
    point_ttl_seconds: u64,
    list_ttl_seconds: u64,
}

impl CacheLayer {
    pub fn new(
        backend: Arc<dyn KeyValueCache>,
        point_ttl_seconds: u64,
        list_ttl_seconds: u64,
    ) -> Self {
        Self {
            backend,
            point_ttl_seconds,
            list_ttl_seconds,
        }
    }

    /// TTL applied to by-id and by-slug entries.
    pub fn point_ttl(&self) -> u64 {
        self.point_ttl_seconds
    }

    /// TTL applied to list, hierarchy, and aggregate entries.
    pub fn list_ttl(&self) -> u64 {
        self.list_ttl_seconds
    }

    /// Typed read. Any backend error or deserialization failure is a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.backend.get(key).await.ok().flatten()?;

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding undeserializable cache entry {}: {}", key, e);
                let _ = self.backend.delete(key).await;
                None
            }
        }
    }

    /// Typed write. Serialization or backend failures are logged and ignored.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize cache entry {}: {}", key, e);
                return;
            }
        };

        let _ = self.backend.set(key, &raw, ttl_seconds).await;
    }

    /// Deletes a single key.
    pub async fn delete(&self, key: &str) {
        let _ = self.backend.delete(key).await;
    }

    /// Invalidation after any committed category write (create, update,
    /// move, delete).
    ///
    /// Point lookups are deleted precisely: the by-id key when the id is
    /// known and the by-slug key when the pre-write slug is known. List and
    /// hierarchy entries carry too many parameter combinations for keyed
    /// deletes, so those namespaces are purged by pattern along with the
    /// aggregate counts. `affected_parents` records which sibling sets
    /// changed; the pattern purge already covers them.
    pub async fn invalidate_category_write(
        &self,
        category_id: Option<i64>,
        old_slug: Option<&str>,
        affected_parents: &[Option<i64>],
    ) {
        debug!(
            category_id = ?category_id,
            affected_parents = ?affected_parents,
            "Invalidating category cache after write"
        );

        if let Some(id) = category_id {
            self.backend.delete(&keys::id_key(id)).await.ok();
        }
        if let Some(slug) = old_slug {
            self.backend.delete(&keys::slug_key(slug)).await.ok();
        }

        self.backend
            .delete_by_pattern(&keys::hierarchy_pattern())
            .await
            .ok();
        self.backend.delete(&keys::course_counts_key()).await.ok();
        self.backend
            .delete_by_pattern(&keys::list_pattern())
            .await
            .ok();
    }

    /// Invalidation after a committed change to one course's category links.
    ///
    /// Deletes the course's own membership entry, the aggregate counts, and
    /// every course listing of each affected category.
    pub async fn invalidate_course_links(&self, course_id: i64, category_ids: &[i64]) {
        debug!(
            course_id,
            category_ids = ?category_ids,
            "Invalidating course-category cache after write"
        );

        self.backend
            .delete(&keys::categories_for_course_key(course_id))
            .await
            .ok();
        self.backend.delete(&keys::course_counts_key()).await.ok();

        for &category_id in category_ids {
            self.backend
                .delete_by_pattern(&keys::courses_for_category_pattern(category_id))
                .await
                .ok();
        }
    }

    /// Purges the entire category namespace. Returns the number of keys
    /// deleted.
    pub async fn clear_all(&self) -> u64 {
        self.backend
            .delete_by_pattern(&keys::all_pattern())
            .await
            .unwrap_or(0)
    }

    /// Backend reachability.
    pub async fn healthy(&self) -> bool {
        self.backend.ping().await
    }

    /// Key count and backend status for the diagnostics endpoint.
    pub async fn stats(&self) -> CacheStats {
        let keys = self
            .backend
            .keys(&keys::all_pattern())
            .await
            .map(|k| k.len())
            .unwrap_or(0);

        CacheStats {
            backend: self.backend.name(),
            keys,
            healthy: self.backend.ping().await,
        }
    }

    /// Set/get/delete round trip against the backend.
    ///
    /// Returns false when the written value does not read back, which is the
    /// expected outcome on [`super::NullCache`].
    pub async fn probe(&self) -> bool {
        let key = format!("{}:probe", keys::NAMESPACE);
        let payload = json!({ "probe": true });

        self.set_json(&key, &payload, 60).await;
        let read_back: Option<serde_json::Value> = self.get_json(&key).await;
        self.delete(&key).await;

        read_back.is_some_and(|v| v == payload)
    }
}
