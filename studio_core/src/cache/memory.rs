use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::error::Result;

/// Expiry policy for a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryOptions {
    pub ttl: Duration,
    pub sliding: Option<Duration>,
}

impl EntryOptions {
    pub fn absolute(ttl: Duration) -> Self {
        Self { ttl, sliding: None }
    }

    pub fn sliding(ttl: Duration, window: Duration) -> Self {
        Self {
            ttl,
            sliding: Some(window),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: serde_json::Value,
    pub created_at: Instant,
    pub expires_at: Instant,
    pub sliding: Option<Duration>,
    pub last_access: Instant,
    pub access_count: u64,
}

impl CacheEntry {
    pub fn new(data: serde_json::Value, options: EntryOptions) -> Self {
        let now = Instant::now();

        Self {
            data,
            created_at: now,
            expires_at: now + options.ttl,
            sliding: options.sliding,
            last_access: now,
            access_count: 0,
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        if now >= self.expires_at {
            return true;
        }

        match self.sliding {
            Some(window) => now >= self.last_access + window,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Time left before the entry expires if it is not read again.
    pub fn remaining(&self, now: Instant) -> Duration {
        let deadline = match self.sliding {
            Some(window) => self.expires_at.min(self.last_access + window),
            None => self.expires_at,
        };
        deadline.saturating_duration_since(now)
    }

    fn touch(&mut self, now: Instant) {
        self.last_access = now;
        self.access_count += 1;
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub current_size: usize,
    pub hit_rate: f64,
    pub total_requests: u64,
}

impl CacheStats {
    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.total_requests += 1;
        self.update_hit_rate();
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
        self.total_requests += 1;
        self.update_hit_rate();
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn update_size(&mut self, size: usize) {
        self.current_size = size;
    }

    fn update_hit_rate(&mut self) {
        if self.total_requests > 0 {
            self.hit_rate = self.hits as f64 / self.total_requests as f64;
        }
    }
}

/// Snapshot of one live key for diagnostics.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheKeyInfo {
    pub key: String,
    pub age_seconds: u64,
    pub expires_in_seconds: u64,
    pub sliding: bool,
    pub hits: u64,
}

/// In-process TTL cache. Entries expire on an absolute deadline and,
/// optionally, after a sliding idle window. There is no size bound.
///
/// Every removal bumps `generation`. A value computed by `get_or_compute`
/// is only stored when no removal happened while it was being computed.
#[derive(Debug, Clone)]
pub struct TtlCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    generation: Arc<AtomicU64>,
    stats: Arc<RwLock<CacheStats>>,
    last_cleanup: Arc<RwLock<Instant>>,
    default_options: EntryOptions,
    cleanup_interval: Duration,
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl TtlCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_options(
            EntryOptions::absolute(Duration::from_secs(config.default_ttl_seconds)),
            Duration::from_secs(config.cleanup_interval_seconds),
        )
    }

    pub fn with_options(default_options: EntryOptions, cleanup_interval: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
            stats: Arc::new(RwLock::new(CacheStats::default())),
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
            default_options,
            cleanup_interval,
        }
    }

    pub fn default_options(&self) -> EntryOptions {
        self.default_options
    }

    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        self.cleanup_expired_if_needed();

        let now = Instant::now();
        let mut entries = self.entries.write();

        let Some(entry) = entries.get_mut(key) else {
            self.stats.write().record_miss();
            debug!("Cache miss for key: {}", key);
            return None;
        };

        if entry.is_expired_at(now) {
            entries.remove(key);
            let mut stats = self.stats.write();
            stats.record_expirations(1);
            stats.record_miss();
            stats.update_size(entries.len());
            debug!("Cache entry expired for key: {}", key);
            return None;
        }

        entry.touch(now);

        match serde_json::from_value(entry.data.clone()) {
            Ok(value) => {
                self.stats.write().record_hit();
                debug!("Cache hit for key: {}", key);
                Some(value)
            }
            Err(e) => {
                warn!("Failed to deserialize cached value for key {}: {}", key, e);
                entries.remove(key);
                let mut stats = self.stats.write();
                stats.record_miss();
                stats.update_size(entries.len());
                None
            }
        }
    }

    pub fn set<T>(&self, key: &str, value: &T) -> std::result::Result<(), serde_json::Error>
    where
        T: Serialize,
    {
        self.set_with_options(key, value, self.default_options)
    }

    pub fn set_with_options<T>(
        &self,
        key: &str,
        value: &T,
        options: EntryOptions,
    ) -> std::result::Result<(), serde_json::Error>
    where
        T: Serialize,
    {
        self.store(key, value, options, None).map(|_| ())
    }

    /// Inserts unless `expected_generation` is given and a removal has
    /// happened since it was read. Returns whether the entry was stored.
    fn store<T>(
        &self,
        key: &str,
        value: &T,
        options: EntryOptions,
        expected_generation: Option<u64>,
    ) -> std::result::Result<bool, serde_json::Error>
    where
        T: Serialize,
    {
        let data = serde_json::to_value(value)?;
        let entry = CacheEntry::new(data, options);

        let mut entries = self.entries.write();
        if let Some(expected) = expected_generation {
            if self.generation.load(Ordering::Acquire) != expected {
                debug!("Discarding value for key {}: cache was invalidated during compute", key);
                return Ok(false);
            }
        }

        entries.insert(key.to_string(), entry);
        self.stats.write().update_size(entries.len());

        debug!("Cached value for key: {} (TTL: {:?}, sliding: {:?})", key, options.ttl, options.sliding);
        Ok(true)
    }

    /// Current invalidation generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Returns the cached value for `key`, or runs `compute`, stores its
    /// output under `options` and returns it. A failed compute stores nothing,
    /// and neither does one that overlapped a removal: the caller still gets
    /// the value, the next read recomputes.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, options: EntryOptions, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get::<T>(key) {
            return Ok(value);
        }

        let generation = self.generation();
        let value = compute().await?;

        if let Err(e) = self.store(key, &value, options, Some(generation)) {
            warn!("Failed to cache value for key {}: {}", key, e);
        }

        Ok(value)
    }

    pub fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.write();
        self.bump_generation();
        let removed = entries.remove(key).is_some();
        self.stats.write().update_size(entries.len());

        if removed {
            debug!("Removed cache entry for key: {}", key);
        }

        removed
    }

    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        self.bump_generation();
        let removed = entries.len();
        entries.clear();
        self.stats.write().update_size(0);

        debug!("Cleared all {} cache entries", removed);
        removed
    }

    pub fn clear_by_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write();
        self.bump_generation();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        self.stats.write().update_size(entries.len());

        debug!("Invalidated {} cache entries with prefix: {}", removed, prefix);
        removed
    }

    /// True when `key` holds an unexpired entry. Does not count as a read.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    /// Live keys, sorted, with their remaining lifetime.
    pub fn keys(&self) -> Vec<CacheKeyInfo> {
        let now = Instant::now();
        let entries = self.entries.read();

        let mut keys: Vec<CacheKeyInfo> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| CacheKeyInfo {
                key: key.clone(),
                age_seconds: now.saturating_duration_since(entry.created_at).as_secs(),
                expires_in_seconds: entry.remaining(now).as_secs(),
                sliding: entry.sliding.is_some(),
                hits: entry.access_count,
            })
            .collect();

        keys.sort_by(|a, b| a.key.cmp(&b.key));
        keys
    }

    pub fn stats(&self) -> CacheStats {
        let size = self.entries.read().len();
        let mut stats = self.stats.write();
        stats.update_size(size);
        stats.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();

        let mut stats = self.stats.write();
        stats.record_expirations(removed);
        stats.update_size(entries.len());

        if removed > 0 {
            debug!("Purged {} expired cache entries", removed);
        }
        removed
    }

    fn cleanup_expired_if_needed(&self) {
        let now = Instant::now();
        let mut last_cleanup = self.last_cleanup.write();

        if now.duration_since(*last_cleanup) > self.cleanup_interval {
            *last_cleanup = now;
            drop(last_cleanup);
            self.purge_expired();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    fn short_cache(ttl_ms: u64) -> TtlCache {
        TtlCache::with_options(
            EntryOptions::absolute(Duration::from_millis(ttl_ms)),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_cache_basic_operations() {
        let cache = TtlCache::default();

        cache.set("test_key", &"test_value").unwrap();
        let value: Option<String> = cache.get("test_key");
        assert_eq!(value, Some("test_value".to_string()));

        let missing: Option<String> = cache.get("missing_key");
        assert_eq!(missing, None);

        assert!(cache.remove("test_key"));
        let removed: Option<String> = cache.get("test_key");
        assert_eq!(removed, None);
    }

    #[test]
    fn test_cache_ttl() {
        let cache = short_cache(100);

        cache.set("ttl_key", &"ttl_value").unwrap();
        let value: Option<String> = cache.get("ttl_key");
        assert_eq!(value, Some("ttl_value".to_string()));

        thread::sleep(Duration::from_millis(200));

        let expired: Option<String> = cache.get("ttl_key");
        assert_eq!(expired, None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sliding_window_expires_idle_entries() {
        let cache = short_cache(10_000);
        let options = EntryOptions::sliding(Duration::from_secs(10), Duration::from_millis(150));

        cache.set_with_options("slide", &1u32, options).unwrap();

        for _ in 0..4 {
            thread::sleep(Duration::from_millis(60));
            assert_eq!(cache.get::<u32>("slide"), Some(1));
        }

        thread::sleep(Duration::from_millis(250));
        assert_eq!(cache.get::<u32>("slide"), None);
    }

    #[test]
    fn test_sliding_window_never_outlives_absolute_ttl() {
        let cache = short_cache(10_000);
        let options = EntryOptions::sliding(Duration::from_millis(150), Duration::from_millis(100));

        cache.set_with_options("capped", &1u32, options).unwrap();
        for _ in 0..2 {
            thread::sleep(Duration::from_millis(50));
            assert_eq!(cache.get::<u32>("capped"), Some(1));
        }

        thread::sleep(Duration::from_millis(80));
        assert_eq!(cache.get::<u32>("capped"), None);
    }

    #[tokio::test]
    async fn test_get_or_compute_runs_compute_once() {
        let cache = TtlCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            let value: u32 = cache
                .get_or_compute("answer", cache.default_options(), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_compute_recomputes_after_expiry() {
        let cache = short_cache(50);
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            let _: u32 = cache
                .get_or_compute("k", cache.default_options(), || async move {
                    Ok(calls.fetch_add(1, Ordering::SeqCst) as u32)
                })
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_compute_is_not_cached() {
        let cache = TtlCache::default();

        let result: Result<u32> = cache
            .get_or_compute("broken", cache.default_options(), || async {
                Err(AppError::MediaSource("unavailable".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert!(!cache.contains_key("broken"));
    }

    #[tokio::test]
    async fn test_clear_during_compute_is_not_undone() {
        let cache = TtlCache::default();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let pending = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_compute("portfolio_images_all_1_8", cache.default_options(), || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok(3u32)
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        cache.clear_by_prefix("portfolio_");
        release_tx.send(()).unwrap();

        assert_eq!(pending.await.unwrap().unwrap(), 3);
        assert!(!cache.contains_key("portfolio_images_all_1_8"));

        let fresh: u32 = cache
            .get_or_compute("portfolio_images_all_1_8", cache.default_options(), || async { Ok(1) })
            .await
            .unwrap();
        assert_eq!(fresh, 1);
        assert_eq!(cache.get::<u32>("portfolio_images_all_1_8"), Some(1));
    }

    #[test]
    fn test_clear_by_prefix() {
        let cache = TtlCache::default();

        cache.set("portfolio_images_all_1_8", &"a").unwrap();
        cache.set("portfolio_images_all_2_8", &"b").unwrap();
        cache.set("portfolio_images_food-beverage_1_8", &"c").unwrap();
        cache.set("portfolio_stats", &"d").unwrap();

        assert_eq!(cache.clear_by_prefix("portfolio_images_all_"), 2);
        assert!(!cache.contains_key("portfolio_images_all_1_8"));
        assert!(cache.contains_key("portfolio_images_food-beverage_1_8"));
        assert!(cache.contains_key("portfolio_stats"));

        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keys_snapshot() {
        let cache = TtlCache::default();
        cache.set("b", &1).unwrap();
        cache.set("a", &2).unwrap();

        let keys: Vec<String> = cache.keys().into_iter().map(|k| k.key).collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_cache_stats() {
        let cache = TtlCache::default();

        cache.set("key1", &"value1").unwrap();
        cache.set("key2", &"value2").unwrap();

        let _: Option<String> = cache.get("key1");
        let _: Option<String> = cache.get("key1");
        let _: Option<String> = cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.current_size, 2);
        assert!((stats.hit_rate - 0.6666666666666666).abs() < 0.0001);
    }

    #[test]
    fn test_purge_expired() {
        let cache = short_cache(30);
        cache.set("gone", &1).unwrap();
        cache
            .set_with_options("kept", &2, EntryOptions::absolute(Duration::from_secs(60)))
            .unwrap();

        thread::sleep(Duration::from_millis(60));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().expirations, 1);
    }
}
