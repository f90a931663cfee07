use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::cancel::CancelSignal;
use super::toucher::ImageToucher;
use crate::config::WarmingConfig;
use crate::portfolio::{crop_url, MediaItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarmReport {
    pub total: usize,
    pub warmed: usize,
    pub failed: usize,
    /// Items never started because cancellation arrived first.
    pub skipped: usize,
    pub crop_sizes: Vec<String>,
    pub elapsed_ms: u64,
}

impl WarmReport {
    pub fn summary(&self) -> String {
        let mut message = format!("Image warming completed: {} images warmed successfully", self.warmed);
        if self.failed > 0 {
            message.push_str(&format!(", {} images failed", self.failed));
        }
        if self.skipped > 0 {
            message.push_str(&format!(", {} skipped after cancellation", self.skipped));
        }
        message
    }
}

/// Touches every crop variant of every item, at most `concurrency` items
/// at a time. One item's failure never aborts the batch.
#[derive(Clone)]
pub struct ImageWarmer {
    toucher: Arc<dyn ImageToucher>,
    concurrency: usize,
    crop_sizes: Arc<Vec<String>>,
}

impl ImageWarmer {
    pub fn new(toucher: Arc<dyn ImageToucher>, config: &WarmingConfig) -> Self {
        Self::with_limits(toucher, config.concurrent_requests, config.crop_sizes.clone())
    }

    pub fn with_limits(toucher: Arc<dyn ImageToucher>, concurrency: usize, crop_sizes: Vec<String>) -> Self {
        Self {
            toucher,
            concurrency: concurrency.max(1),
            crop_sizes: Arc::new(crop_sizes),
        }
    }

    pub async fn warm(&self, items: Vec<MediaItem>, cancel: CancelSignal) -> WarmReport {
        let started = Instant::now();
        let total = items.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut waiter = cancel.clone();
        let mut spawned = 0;

        info!("Warming {} images ({} at a time)", total, self.concurrency);

        for item in items {
            if cancel.is_cancelled() {
                break;
            }

            let permit = tokio::select! {
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                _ = waiter.cancelled() => break,
            };

            let toucher = Arc::clone(&self.toucher);
            let crop_sizes = Arc::clone(&self.crop_sizes);
            spawned += 1;

            tasks.spawn(async move {
                let warmed = warm_item(toucher.as_ref(), &item, &crop_sizes).await;
                drop(permit);
                warmed
            });
        }

        let mut warmed = 0;
        let mut failed = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => warmed += 1,
                Ok(false) => failed += 1,
                Err(e) => {
                    warn!("Warming task aborted: {}", e);
                    failed += 1;
                }
            }
        }

        let report = WarmReport {
            total,
            warmed,
            failed,
            skipped: total - spawned,
            crop_sizes: self.crop_sizes.as_ref().clone(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        info!("{} in {} ms", report.summary(), report.elapsed_ms);
        report
    }
}

/// True only when every variant answered with success.
async fn warm_item(toucher: &dyn ImageToucher, item: &MediaItem, crop_sizes: &[String]) -> bool {
    let mut ok = true;

    for size in crop_sizes {
        let url = crop_url(&item.original_url, size);
        match toucher.touch(&url).await {
            Ok(()) => debug!("Warmed {} - {} crop", item.title, size),
            Err(e) => {
                warn!("Failed to warm {} - {} crop: {}", item.title, size, e);
                ok = false;
            }
        }
    }

    ok
}
