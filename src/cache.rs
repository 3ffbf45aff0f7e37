// TTL snapshot cache in front of a catalog source. The listing engine always
// works over one immutable snapshot; this layer decides how long a fetched
// city listing stays warm before the source is asked again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use parking_lot::RwLock;
use tracing::debug;

use crate::catalog::{CatalogSource, FetchError, HotelRecord};
use crate::query::StayDates;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 64,
            default_ttl: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicUsize,
    misses: AtomicUsize,
    evictions: AtomicUsize,
    expired: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub items: usize,
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
    pub expired: usize,
}

struct CacheEntry {
    records: Arc<Vec<HotelRecord>>,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

// One cache key per (city, stay) combination: the unit of fetch for the
// consumer flow is a city listing for a date pair.
fn snapshot_key(city: &str, stay: &StayDates) -> String {
    format!("{}:{}:{}", city, stay.check_in(), stay.check_out())
}

pub struct CatalogCache<S> {
    source: S,
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: CacheConfig,
    counters: CacheCounters,
}

impl<S: CatalogSource> CatalogCache<S> {
    pub fn new(source: S, config: CacheConfig) -> Self {
        Self {
            source,
            entries: RwLock::new(HashMap::new()),
            config,
            counters: CacheCounters::default(),
        }
    }

    // Get-or-fetch. A fresh entry is returned as-is; an expired or absent
    // one triggers a source fetch and re-insert.
    pub async fn snapshot(
        &self,
        city: &str,
        stay: &StayDates,
    ) -> Result<Arc<Vec<HotelRecord>>, FetchError> {
        let key = snapshot_key(city, stay);

        {
            let entries = self.entries.read();
            if let Some(entry) = entries.get(&key) {
                if !entry.is_expired() {
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(Arc::clone(&entry.records));
                }
                self.counters.expired.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!(city, "catalog snapshot miss, fetching from source");
        let records = Arc::new(self.source.fetch(city, stay).await?);

        let mut entries = self.entries.write();
        if !entries.contains_key(&key) && entries.len() >= self.config.max_entries {
            self.evict_oldest(&mut entries);
        }
        entries.insert(
            key,
            CacheEntry {
                records: Arc::clone(&records),
                created_at: Instant::now(),
                ttl: self.config.default_ttl,
            },
        );

        Ok(records)
    }

    fn evict_oldest(&self, entries: &mut HashMap<String, CacheEntry>) {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            entries.remove(&key);
            self.counters.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    // Bulk invalidation: all snapshots for one city, or everything.
    pub fn invalidate(&self, city: Option<&str>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        match city {
            Some(city) => {
                let prefix = format!("{}:", city);
                entries.retain(|key, _| !key.starts_with(&prefix));
            }
            None => entries.clear(),
        }
        before - entries.len()
    }

    // Warms snapshots for the given cities concurrently. Returns how many of
    // them are resident afterwards; failed fetches are skipped.
    pub async fn prefetch(&self, cities: &[&str], stay: &StayDates) -> usize {
        let fetches = cities.iter().map(|city| self.snapshot(city, stay));
        join_all(fetches)
            .await
            .into_iter()
            .filter(Result::is_ok)
            .count()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            items: self.entries.read().len(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            expired: self.counters.expired.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MockCatalogSource, CITY_ALL};
    use async_trait::async_trait;

    struct FailingSource;

    #[async_trait]
    impl CatalogSource for FailingSource {
        async fn fetch(
            &self,
            _city: &str,
            _stay: &StayDates,
        ) -> Result<Vec<HotelRecord>, FetchError> {
            Err(FetchError::Network("supplier down".to_string()))
        }
    }

    fn cache_with(config: CacheConfig) -> CatalogCache<MockCatalogSource> {
        CatalogCache::new(MockCatalogSource::with_mock_data(), config)
    }

    #[tokio::test]
    async fn second_snapshot_is_a_hit() {
        let cache = cache_with(CacheConfig::default());
        let stay = StayDates::default();

        let first = cache.snapshot("北京", &stay).await.unwrap();
        let second = cache.snapshot("北京", &stay).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.items, 1);
    }

    #[tokio::test]
    async fn expired_snapshot_refetches() {
        let cache = cache_with(CacheConfig {
            max_entries: 8,
            default_ttl: Duration::from_millis(20),
        });
        let stay = StayDates::default();

        cache.snapshot("北京", &stay).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.snapshot("北京", &stay).await.unwrap();

        let stats = cache.stats();
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 0);
    }

    #[tokio::test]
    async fn invalidate_removes_by_city() {
        let cache = cache_with(CacheConfig::default());
        let stay = StayDates::default();

        cache.snapshot("北京", &stay).await.unwrap();
        cache.snapshot("上海", &stay).await.unwrap();
        cache.snapshot(CITY_ALL, &stay).await.unwrap();

        assert_eq!(cache.invalidate(Some("北京")), 1);
        assert_eq!(cache.stats().items, 2);

        assert_eq!(cache.invalidate(None), 2);
        assert_eq!(cache.stats().items, 0);
    }

    #[tokio::test]
    async fn capacity_cap_evicts_the_oldest_snapshot() {
        let cache = cache_with(CacheConfig {
            max_entries: 2,
            default_ttl: Duration::from_secs(300),
        });
        let stay = StayDates::default();

        // Spaced out so created_at strictly orders the entries.
        cache.snapshot("北京", &stay).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.snapshot("上海", &stay).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.snapshot("广州", &stay).await.unwrap();

        let stats = cache.stats();
        assert_eq!(stats.items, 2);
        assert_eq!(stats.evictions, 1);

        // The oldest (北京) went; the newer two still hit.
        cache.snapshot("上海", &stay).await.unwrap();
        cache.snapshot("广州", &stay).await.unwrap();
        assert_eq!(cache.stats().hits, 2);
    }

    #[test]
    fn prefetch_warms_all_requested_cities() {
        let cache = cache_with(CacheConfig::default());
        let stay = StayDates::default();

        let warmed = tokio_test::block_on(cache.prefetch(&["北京", "上海", "成都"], &stay));
        assert_eq!(warmed, 3);
        assert_eq!(cache.stats().items, 3);
    }

    #[tokio::test]
    async fn source_failure_propagates_and_caches_nothing() {
        let cache = CatalogCache::new(FailingSource, CacheConfig::default());
        let stay = StayDates::default();

        let err = cache.snapshot("北京", &stay).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(cache.stats().items, 0);
        assert_eq!(cache.stats().misses, 1);
    }
}
