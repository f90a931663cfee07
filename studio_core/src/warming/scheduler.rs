use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::cancel::CancelSignal;
use super::service::WarmingService;
use crate::config::WarmingConfig;

/// Periodic background warming: once after a startup delay, then every
/// `interval_hours` until shutdown.
pub struct WarmingScheduler {
    service: WarmingService,
    enabled: bool,
    startup_delay: Option<Duration>,
    interval: Duration,
}

impl WarmingScheduler {
    pub fn new(service: WarmingService, config: &WarmingConfig) -> Self {
        Self {
            service,
            enabled: config.enabled,
            startup_delay: config
                .startup_enabled
                .then(|| Duration::from_secs(config.startup_delay_seconds)),
            interval: Duration::from_secs(config.interval_hours.max(1) * 3600),
        }
    }

    pub fn with_interval(mut self, startup_delay: Option<Duration>, interval: Duration) -> Self {
        self.startup_delay = startup_delay;
        self.interval = interval;
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        let shutdown = self.service.cancel_handle().signal();
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: CancelSignal) {
        if !self.enabled {
            info!("Image warming scheduler disabled");
            return;
        }

        if let Some(delay) = self.startup_delay {
            info!("Startup image warming scheduled in {:?}", delay);
            tokio::select! {
                _ = tokio::time::sleep(delay) => self.run_once("startup").await,
                _ = shutdown.cancelled() => {
                    info!("Image warming scheduler stopped before startup run");
                    return;
                }
            }
        }

        info!("Image warming scheduled every {:?}", self.interval);
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => self.run_once("scheduled").await,
                _ = shutdown.cancelled() => break,
            }
        }

        info!("Image warming scheduler stopped");
    }

    async fn run_once(&self, trigger: &str) {
        match self.service.warm_all().await {
            Ok(report) => info!("{} image warming finished: {}", trigger, report.summary()),
            Err(e) => error!("{} image warming failed: {}", trigger, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;
    use crate::config::{CacheConfig, PortfolioConfig};
    use crate::error::Result;
    use crate::portfolio::models::fixtures::gallery;
    use crate::portfolio::{PortfolioService, StaticMediaSource};
    use crate::warming::cancel::CancelHandle;
    use crate::warming::toucher::ImageToucher;
    use crate::warming::warmer::ImageWarmer;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageToucher for Recorder {
        async fn touch(&self, _url: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn warming_service(toucher: Arc<Recorder>) -> WarmingService {
        let portfolio = PortfolioService::new(
            Arc::new(StaticMediaSource::new(gallery(2, 0))),
            TtlCache::default(),
            &CacheConfig::default(),
            &PortfolioConfig::default(),
        );
        let warmer = ImageWarmer::with_limits(toucher, 2, vec!["small".to_string()]);
        WarmingService::new(portfolio, warmer, CancelHandle::new())
    }

    #[tokio::test]
    async fn test_startup_and_periodic_runs_until_shutdown() {
        let toucher = Arc::new(Recorder::default());
        let service = warming_service(toucher.clone());
        let cancel = service.cancel_handle().clone();

        let handle = WarmingScheduler::new(service, &WarmingConfig::default())
            .with_interval(Some(Duration::from_millis(10)), Duration::from_millis(30))
            .spawn();

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();

        assert!(toucher.calls.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn test_disabled_scheduler_returns_immediately() {
        let toucher = Arc::new(Recorder::default());
        let config = WarmingConfig {
            enabled: false,
            ..WarmingConfig::default()
        };

        let handle = WarmingScheduler::new(warming_service(toucher.clone()), &config).spawn();
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
        assert_eq!(toucher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shutdown_during_startup_delay() {
        let toucher = Arc::new(Recorder::default());
        let service = warming_service(toucher.clone());
        let cancel = service.cancel_handle().clone();

        let handle = WarmingScheduler::new(service, &WarmingConfig::default()).spawn();
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
        assert_eq!(toucher.calls.load(Ordering::SeqCst), 0);
    }
}
