//! Timed cache for slow-changing provider lookups

use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Thread-safe symbol → display-name cache.
///
/// Display names rarely change; the TTL comes from the config. The bot core
/// itself stays cache-free; this lives strictly inside the provider layer.
pub struct NameCache {
    cache: Arc<RwLock<TimedCache<String, String>>>,
}

impl NameCache {
    /// Create a new cache with the specified TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a cached name.
    pub async fn get(&self, symbol: &str) -> Option<String> {
        let key = symbol.to_string();
        let mut cache = self.cache.write().await;
        cache.cache_get(&key).cloned()
    }

    /// Insert a name.
    pub async fn insert(&self, symbol: String, name: String) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(symbol, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = NameCache::new(Duration::from_secs(60));
        assert_eq!(cache.get("2330").await, None);

        cache.insert("2330".to_string(), "台積電".to_string()).await;
        assert_eq!(cache.get("2330").await.as_deref(), Some("台積電"));
    }

    #[tokio::test]
    async fn test_expiry() {
        let cache = NameCache::new(Duration::from_millis(10));
        cache.insert("2330".to_string(), "台積電".to_string()).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("2330").await, None);
    }
}
