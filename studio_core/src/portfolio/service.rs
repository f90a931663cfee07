use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

use super::cache::{images_key, PortfolioCache, MAIN_PAGE_KEY, STATS_KEY};
use super::models::{CategoryFilter, MediaItem, PortfolioMainPage, PortfolioStats};
use super::source::MediaSource;
use crate::cache::TtlCache;
use crate::config::{CacheConfig, PortfolioConfig};
use crate::error::Result;
use crate::models::{PageRequest, PagedResult};

#[derive(Clone)]
pub struct PortfolioService {
    source: Arc<dyn MediaSource>,
    cache: PortfolioCache,
    default_page_size: u32,
    max_page_size: u32,
}

impl PortfolioService {
    pub fn new(
        source: Arc<dyn MediaSource>,
        cache: TtlCache,
        cache_config: &CacheConfig,
        portfolio_config: &PortfolioConfig,
    ) -> Self {
        Self {
            source,
            cache: PortfolioCache::new(cache, cache_config, portfolio_config),
            default_page_size: portfolio_config.default_page_size,
            max_page_size: portfolio_config.max_page_size,
        }
    }

    pub fn cache(&self) -> &PortfolioCache {
        &self.cache
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    pub fn page_request(&self, page: Option<i64>, page_size: Option<i64>) -> PageRequest {
        PageRequest::clamped(page, page_size, self.default_page_size, self.max_page_size)
    }

    /// Uncached listing, filtered.
    pub async fn items(&self, filter: CategoryFilter) -> Result<Vec<MediaItem>> {
        let items = self.source.list_all().await?;
        Ok(items.into_iter().filter(|item| filter.matches(item)).collect())
    }

    /// One cached page. A failing source yields an empty page.
    pub async fn images_page(&self, filter: CategoryFilter, request: PageRequest) -> PagedResult<MediaItem> {
        let key = images_key(filter, request);

        let result = self
            .cache
            .store()
            .get_or_compute(&key, self.cache.page_options(), || async {
                let items = self.items(filter).await?;
                Ok(request.slice(&items))
            })
            .await;

        match result {
            Ok(page) => page,
            Err(e) => {
                error!(
                    "Error loading portfolio images for page={}, category={}: {}",
                    request.page, filter, e
                );
                PagedResult::empty(request)
            }
        }
    }

    pub async fn stats(&self) -> Result<PortfolioStats> {
        self.cache
            .store()
            .get_or_compute(STATS_KEY, self.cache.page_options(), || async {
                let items = self.source.list_all().await?;
                Ok(PortfolioStats::from_items(&items))
            })
            .await
    }

    /// The landing-page model. Unlike pages this entry has a sliding window.
    pub async fn main_page(&self) -> PortfolioMainPage {
        let result = self
            .cache
            .store()
            .get_or_compute(MAIN_PAGE_KEY, self.cache.main_page_options(), || async {
                let images = self.source.list_all().await?;
                Ok(PortfolioMainPage {
                    stats: PortfolioStats::from_items(&images),
                    images,
                    generated_at: Utc::now(),
                })
            })
            .await;

        result.unwrap_or_else(|e| {
            error!("Error loading portfolio main page: {}", e);
            PortfolioMainPage {
                images: Vec::new(),
                stats: PortfolioStats::from_items(&[]),
                generated_at: Utc::now(),
            }
        })
    }

    /// Re-reads the media store and drops every cached projection.
    /// The source is read first so a broken manifest leaves the cache intact.
    pub async fn reload(&self) -> Result<usize> {
        let count = self.source.list_all().await?.len();
        let removed = self.cache.clear_all();
        info!("Portfolio media reloaded: {} items, {} cache entries dropped", count, removed);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::portfolio::models::{fixtures::gallery, Category};
    use crate::portfolio::source::StaticMediaSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSource {
        inner: StaticMediaSource,
        calls: AtomicUsize,
        fail: bool,
        delay: Duration,
    }

    #[async_trait]
    impl MediaSource for CountingSource {
        async fn list_all(&self) -> Result<Vec<MediaItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::MediaSource("media store offline".to_string()));
            }
            let items = self.inner.list_all().await;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            items
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn service_with(source: Arc<CountingSource>) -> PortfolioService {
        PortfolioService::new(
            source,
            TtlCache::default(),
            &CacheConfig::default(),
            &PortfolioConfig::default(),
        )
    }

    fn counting(fashion: usize, food: usize, fail: bool) -> Arc<CountingSource> {
        Arc::new(CountingSource {
            inner: StaticMediaSource::new(gallery(fashion, food)),
            calls: AtomicUsize::new(0),
            fail,
            delay: Duration::ZERO,
        })
    }

    #[tokio::test]
    async fn test_pages_are_filtered_and_cached() {
        let source = counting(10, 5, false);
        let service = service_with(source.clone());
        let food = CategoryFilter::Only(Category::FoodBeverage);
        let request = service.page_request(Some(1), Some(4));

        let first = service.images_page(food, request).await;
        assert_eq!(first.items.len(), 4);
        assert_eq!(first.total_items, 5);
        assert!(first.items.iter().all(|i| i.category == Category::FoodBeverage));

        let again = service.images_page(food, request).await;
        assert_eq!(again, first);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_page_beyond_range_is_empty() {
        let service = service_with(counting(3, 0, false));
        let page = service
            .images_page(CategoryFilter::All, service.page_request(Some(5), None))
            .await;

        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 3);
        assert_eq!(page.page_size, 8);
    }

    #[tokio::test]
    async fn test_page_size_is_clamped() {
        let service = service_with(counting(1, 0, false));
        assert_eq!(service.page_request(None, Some(500)).page_size, 50);
        assert_eq!(service.page_request(Some(-3), Some(0)), PageRequest { page: 1, page_size: 1 });
    }

    #[tokio::test]
    async fn test_failing_source_degrades_and_is_not_cached() {
        let source = counting(0, 0, true);
        let service = service_with(source.clone());
        let request = service.page_request(None, None);

        let page = service.images_page(CategoryFilter::All, request).await;
        assert!(page.items.is_empty());
        let _ = service.images_page(CategoryFilter::All, request).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(service.cache().store().is_empty());
        assert!(service.stats().await.is_err());
        assert!(service.main_page().await.images.is_empty());
    }

    #[tokio::test]
    async fn test_stats_and_main_page() {
        let source = counting(2, 3, false);
        let service = service_with(source.clone());

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_images, 5);
        assert_eq!(stats.category_counts["food-beverage"], 3);

        let main = service.main_page().await;
        assert_eq!(main.images.len(), 5);
        let _ = service.main_page().await;
        let _ = service.stats().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reload_clears_cached_pages() {
        let source = counting(2, 0, false);
        let service = service_with(source.clone());
        let request = service.page_request(None, None);

        assert_eq!(service.images_page(CategoryFilter::All, request).await.total_items, 2);

        source.inner.replace(gallery(4, 0));
        assert_eq!(service.images_page(CategoryFilter::All, request).await.total_items, 2);

        assert_eq!(service.reload().await.unwrap(), 4);
        assert_eq!(service.images_page(CategoryFilter::All, request).await.total_items, 4);
    }

    #[tokio::test]
    async fn test_clear_during_slow_read_does_not_leave_stale_page() {
        let source = Arc::new(CountingSource {
            inner: StaticMediaSource::new(gallery(3, 0)),
            calls: AtomicUsize::new(0),
            fail: false,
            delay: Duration::from_millis(100),
        });
        let service = service_with(source.clone());
        let request = service.page_request(None, None);

        let in_flight = {
            let service = service.clone();
            tokio::spawn(async move { service.images_page(CategoryFilter::All, request).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        source.inner.replace(gallery(1, 0));
        service.cache().clear_all();

        assert_eq!(in_flight.await.unwrap().total_items, 3);
        assert_eq!(service.images_page(CategoryFilter::All, request).await.total_items, 1);
    }
}
