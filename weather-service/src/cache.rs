use common::models::WeatherPayload;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::config::CACHE_TTL;

struct CacheEntry {
    value: WeatherPayload,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Lookup key for a city: trimmed and lower-cased.
pub fn normalize_key(city: &str) -> String {
    city.trim().to_lowercase()
}

/// In-memory weather cache keyed by normalized city name.
///
/// Freshness is checked on read; stale entries stay in the map until the
/// next store for the same key overwrites them. With no `max_entries` the map
/// grows with every distinct city for the life of the process.
pub struct WeatherCache {
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
    max_entries: Option<usize>,
}

impl WeatherCache {
    pub fn new(max_entries: Option<usize>) -> Self {
        Self::with_ttl(CACHE_TTL, max_entries)
    }

    pub fn with_ttl(ttl: Duration, max_entries: Option<usize>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            max_entries,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the stored payload only while it is fresh.
    pub async fn lookup(&self, city: &str) -> Option<WeatherPayload> {
        let key = normalize_key(city);
        let cache = self.cache.read().await;
        cache
            .get(&key)
            .filter(|entry| entry.is_fresh(Instant::now(), self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Inserts or replaces the entry for `city`, stamped with the current time.
    pub async fn store(&self, city: &str, value: WeatherPayload) {
        let key = normalize_key(city);
        let mut cache = self.cache.write().await;

        if let Some(max) = self.max_entries
            && !cache.contains_key(&key)
            && cache.len() >= max
        {
            let oldest = cache
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!(evicted = %oldest, "Cache full, evicting oldest entry");
                cache.remove(&oldest);
            }
        }

        cache.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::CurrentConditions;

    fn payload(city: &str, temperature: f64) -> WeatherPayload {
        WeatherPayload {
            city: city.to_string(),
            lat: 48.85,
            lon: 2.35,
            current: Some(CurrentConditions {
                temperature: Some(temperature),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn normalize_key_is_idempotent() {
        assert_eq!(normalize_key("  New York "), "new york");
        assert_eq!(normalize_key(&normalize_key("  New York ")), "new york");
        assert_eq!(normalize_key("Paris"), normalize_key(" paris "));
    }

    #[tokio::test]
    async fn lookup_after_store_returns_value() {
        let cache = WeatherCache::default();
        let value = payload("Paris", 12.0);

        cache.store("Paris", value.clone()).await;

        assert_eq!(cache.lookup("Paris").await, Some(value));
    }

    #[tokio::test]
    async fn lookup_on_empty_cache_is_absent() {
        let cache = WeatherCache::default();
        assert!(cache.lookup("Paris").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn keys_are_case_and_whitespace_insensitive() {
        let cache = WeatherCache::default();
        let value = payload("Paris", 12.0);

        cache.store("Paris", value.clone()).await;

        assert_eq!(cache.lookup(" paris ").await, Some(value.clone()));
        assert_eq!(cache.lookup("PARIS").await, Some(value));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn store_overwrites_without_merging() {
        let cache = WeatherCache::default();
        let first = payload("Paris", 12.0);
        let second = WeatherPayload {
            current: None,
            ..payload("Paris, France", 20.0)
        };

        cache.store("paris", first).await;
        cache.store("Paris", second.clone()).await;

        assert_eq!(cache.lookup("paris").await, Some(second));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_fresh_until_ttl_elapses() {
        let cache = WeatherCache::default();
        let value = payload("Paris", 12.0);
        let epsilon = Duration::from_millis(1);

        cache.store("Paris", value.clone()).await;

        tokio::time::advance(cache.ttl() - epsilon).await;
        assert_eq!(cache.lookup("Paris").await, Some(value));

        tokio::time::advance(epsilon * 2).await;
        assert!(cache.lookup("Paris").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_stale_exactly_at_ttl() {
        let cache = WeatherCache::with_ttl(Duration::from_secs(60), None);
        cache.store("Oslo", payload("Oslo", -3.0)).await;

        tokio::time::advance(Duration::from_secs(60)).await;

        assert!(cache.lookup("Oslo").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_entries_are_kept_until_overwritten() {
        let cache = WeatherCache::with_ttl(Duration::from_secs(60), None);
        cache.store("Oslo", payload("Oslo", -3.0)).await;

        tokio::time::advance(Duration::from_secs(120)).await;
        assert!(cache.lookup("Oslo").await.is_none());
        assert_eq!(cache.len().await, 1);

        let fresh = payload("Oslo", 1.0);
        cache.store("Oslo", fresh.clone()).await;
        assert_eq!(cache.lookup("Oslo").await, Some(fresh));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_cache_evicts_oldest_write_first() {
        let cache = WeatherCache::with_ttl(Duration::from_secs(600), Some(2));

        cache.store("Oslo", payload("Oslo", 1.0)).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.store("Rome", payload("Rome", 2.0)).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        // Rewriting Oslo makes Rome the oldest write.
        cache.store("Oslo", payload("Oslo", 3.0)).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.store("Lima", payload("Lima", 4.0)).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.lookup("Rome").await.is_none());
        assert!(cache.lookup("Oslo").await.is_some());
        assert!(cache.lookup("Lima").await.is_some());
    }

    #[tokio::test]
    async fn unbounded_cache_keeps_every_key() {
        let cache = WeatherCache::default();
        for i in 0..50 {
            cache.store(&format!("city-{i}"), payload("x", i as f64)).await;
        }
        assert_eq!(cache.len().await, 50);
    }
}
