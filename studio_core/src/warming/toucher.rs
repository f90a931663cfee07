use async_trait::async_trait;
use std::time::Duration;

use crate::config::WarmingConfig;
use crate::error::{AppError, Result};

/// Issues one lightweight request for a derived image URL.
#[async_trait]
pub trait ImageToucher: Send + Sync {
    async fn touch(&self, url: &str) -> Result<()>;
}

/// Sends `HEAD` requests; any non-2xx status is a failure.
#[derive(Clone)]
pub struct HttpToucher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpToucher {
    pub fn new(config: &WarmingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("studio-warmer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URLs pass through; relative ones are joined to the base URL.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }
}

#[async_trait]
impl ImageToucher for HttpToucher {
    async fn touch(&self, url: &str) -> Result<()> {
        let target = self.resolve(url);
        let response = self.client.head(&target).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AppError::Upstream(format!("{} answered {}", target, status)))
        }
    }
}
