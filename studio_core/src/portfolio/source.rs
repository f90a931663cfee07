use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use super::models::{crop_url, sort_media, Category, MediaItem};
use crate::error::{AppError, Result};

/// Read-only view of the external media store.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Every portfolio item, sorted by sort order then title.
    async fn list_all(&self) -> Result<Vec<MediaItem>>;

    fn describe(&self) -> String;
}

/// One entry of the media manifest file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestRecord {
    id: String,
    title: String,
    #[serde(default)]
    alt: Option<String>,
    category: Category,
    original_url: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    sort_order: i32,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<ManifestRecord> for MediaItem {
    fn from(record: ManifestRecord) -> Self {
        let created_at = record.created_at.unwrap_or_default();
        let url = record
            .url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| crop_url(&record.original_url, "small"));

        MediaItem {
            alt: record.alt.unwrap_or_else(|| record.title.clone()),
            id: record.id,
            title: record.title,
            category: record.category,
            original_url: record.original_url,
            url,
            sort_order: record.sort_order,
            created_at,
            updated_at: record.updated_at.unwrap_or(created_at),
        }
    }
}

/// Media listed in a JSON manifest. The file is re-read on every call so
/// edits show up after the next cache invalidation.
#[derive(Debug, Clone)]
pub struct ManifestMediaSource {
    path: PathBuf,
}

impl ManifestMediaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MediaSource for ManifestMediaSource {
    async fn list_all(&self) -> Result<Vec<MediaItem>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Media manifest not found at {}, gallery is empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(AppError::from(e)),
        };

        let records: Vec<ManifestRecord> = serde_json::from_str(&raw).map_err(|e| {
            AppError::MediaSource(format!("Invalid manifest {}: {}", self.path.display(), e))
        })?;

        let mut items: Vec<MediaItem> = records.into_iter().map(MediaItem::from).collect();
        sort_media(&mut items);

        debug!("Loaded {} media items from {}", items.len(), self.path.display());
        Ok(items)
    }

    fn describe(&self) -> String {
        format!("manifest:{}", self.path.display())
    }
}

/// Fixed in-memory media list.
#[derive(Debug, Clone, Default)]
pub struct StaticMediaSource {
    items: Arc<RwLock<Vec<MediaItem>>>,
}

impl StaticMediaSource {
    pub fn new(items: Vec<MediaItem>) -> Self {
        let source = Self::default();
        source.replace(items);
        source
    }

    pub fn replace(&self, mut items: Vec<MediaItem>) {
        sort_media(&mut items);
        *self.items.write() = items;
    }
}

#[async_trait]
impl MediaSource for StaticMediaSource {
    async fn list_all(&self) -> Result<Vec<MediaItem>> {
        Ok(self.items.read().clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}
