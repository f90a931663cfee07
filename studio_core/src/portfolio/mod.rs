//! Portfolio gallery: media listing, category filter, pagination and caching

pub mod cache;
pub mod etag;
pub mod models;
pub mod render;
pub mod service;
pub mod source;

pub use cache::{CacheStatus, PortfolioCache};
pub use etag::{compute_etag, if_none_match_matches};
pub use models::{crop_url, Category, CategoryFilter, MediaItem, PortfolioMainPage, PortfolioStats};
pub use render::{render_gallery_page, render_main_page};
pub use service::PortfolioService;
pub use source::{ManifestMediaSource, MediaSource, StaticMediaSource};
