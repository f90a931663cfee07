//! Portfolio cache keys and targeted invalidation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use super::models::{Category, CategoryFilter};
use crate::cache::{CacheKeyInfo, CacheStats, EntryOptions, TtlCache};
use crate::config::{CacheConfig, PortfolioConfig};
use crate::models::PageRequest;

pub const KEY_PREFIX: &str = "portfolio_";
pub const IMAGES_PREFIX: &str = "portfolio_images_";
pub const STATS_KEY: &str = "portfolio_stats";
pub const MAIN_PAGE_KEY: &str = "portfolio_main_page";

pub fn images_key(filter: CategoryFilter, request: PageRequest) -> String {
    format!("{}{}_{}_{}", IMAGES_PREFIX, filter.as_str(), request.page, request.page_size)
}

fn images_prefix_for(filter: CategoryFilter) -> String {
    format!("{}{}_", IMAGES_PREFIX, filter.as_str())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstPageStatus {
    pub all_images: bool,
    pub fashion_portraits: bool,
    pub food_beverage: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSettings {
    pub api_cache_duration_seconds: u64,
    pub main_page_cache_duration_minutes: u64,
    pub main_page_sliding_minutes: u64,
    pub cleanup_interval_seconds: u64,
    pub default_page_size: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub timestamp: DateTime<Utc>,
    pub main_page_cached: bool,
    pub stats_cached: bool,
    pub api_cache_status: FirstPageStatus,
    pub keys: Vec<CacheKeyInfo>,
    pub stats: CacheStats,
    pub cache_settings: CacheSettings,
}

/// Owns the portfolio's slice of the shared TTL cache.
#[derive(Clone)]
pub struct PortfolioCache {
    cache: TtlCache,
    page_options: EntryOptions,
    main_page_options: EntryOptions,
    settings: CacheSettings,
}

impl PortfolioCache {
    pub fn new(cache: TtlCache, cache_config: &CacheConfig, portfolio_config: &PortfolioConfig) -> Self {
        let main_page_options = EntryOptions::sliding(
            Duration::from_secs(cache_config.main_page_ttl_seconds),
            Duration::from_secs(cache_config.main_page_sliding_seconds),
        );

        Self {
            page_options: EntryOptions::absolute(Duration::from_secs(cache_config.default_ttl_seconds)),
            main_page_options,
            settings: CacheSettings {
                api_cache_duration_seconds: cache_config.default_ttl_seconds,
                main_page_cache_duration_minutes: cache_config.main_page_ttl_seconds / 60,
                main_page_sliding_minutes: cache_config.main_page_sliding_seconds / 60,
                cleanup_interval_seconds: cache_config.cleanup_interval_seconds,
                default_page_size: portfolio_config.default_page_size,
            },
            cache,
        }
    }

    pub fn store(&self) -> &TtlCache {
        &self.cache
    }

    pub fn page_options(&self) -> EntryOptions {
        self.page_options
    }

    pub fn main_page_options(&self) -> EntryOptions {
        self.main_page_options
    }

    /// Drops every portfolio entry.
    pub fn clear_all(&self) -> usize {
        let removed = self.cache.clear_by_prefix(KEY_PREFIX);
        info!("Portfolio cache cleared completely. Removed {} cache entries", removed);
        removed
    }

    pub fn clear_main_page(&self) -> bool {
        let removed = self.cache.remove(MAIN_PAGE_KEY);
        info!("Portfolio main page cache cleared (was cached: {})", removed);
        removed
    }

    /// Drops pages for `filter` plus everything whose content depends on it:
    /// the `all` pages, statistics and the main page.
    pub fn clear_category(&self, filter: CategoryFilter) -> usize {
        let mut removed = self.cache.clear_by_prefix(&images_prefix_for(filter));
        if filter != CategoryFilter::All {
            removed += self.cache.clear_by_prefix(&images_prefix_for(CategoryFilter::All));
        }
        removed += self.cache.remove(STATS_KEY) as usize;
        removed += self.cache.remove(MAIN_PAGE_KEY) as usize;

        info!("Portfolio cache cleared for category '{}'. Removed {} cache entries", filter, removed);
        removed
    }

    pub fn status(&self) -> CacheStatus {
        let first_page = |filter: CategoryFilter| {
            let request = PageRequest { page: 1, page_size: self.settings.default_page_size };
            self.cache.contains_key(&images_key(filter, request))
        };

        CacheStatus {
            timestamp: Utc::now(),
            main_page_cached: self.cache.contains_key(MAIN_PAGE_KEY),
            stats_cached: self.cache.contains_key(STATS_KEY),
            api_cache_status: FirstPageStatus {
                all_images: first_page(CategoryFilter::All),
                fashion_portraits: first_page(CategoryFilter::Only(Category::FashionPortraits)),
                food_beverage: first_page(CategoryFilter::Only(Category::FoodBeverage)),
            },
            keys: self
                .cache
                .keys()
                .into_iter()
                .filter(|info| info.key.starts_with(KEY_PREFIX))
                .collect(),
            stats: self.cache.stats(),
            cache_settings: self.settings.clone(),
        }
    }
}
