use tokio::task::JoinHandle;
use tracing::{error, info};

use super::cancel::CancelHandle;
use super::warmer::{ImageWarmer, WarmReport};
use crate::error::Result;
use crate::portfolio::{CategoryFilter, PortfolioService};

/// Feeds gallery items to the warmer. Every run observes the same
/// cancellation handle, which is fired on shutdown.
#[derive(Clone)]
pub struct WarmingService {
    portfolio: PortfolioService,
    warmer: ImageWarmer,
    cancel: CancelHandle,
}

impl WarmingService {
    pub fn new(portfolio: PortfolioService, warmer: ImageWarmer, cancel: CancelHandle) -> Self {
        Self { portfolio, warmer, cancel }
    }

    pub fn cancel_handle(&self) -> &CancelHandle {
        &self.cancel
    }

    pub async fn warm_all(&self) -> Result<WarmReport> {
        self.warm(CategoryFilter::All).await
    }

    pub async fn warm(&self, filter: CategoryFilter) -> Result<WarmReport> {
        info!("Starting image warming for category: {}", filter);
        let items = self.portfolio.items(filter).await?;
        Ok(self.warmer.warm(items, self.cancel.signal()).await)
    }

    /// Fire-and-forget warm of the whole gallery.
    pub fn spawn_warm_all(&self) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.warm_all().await {
                error!("Background image warming failed: {}", e);
            }
        })
    }
}
