use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub contact: ContactConfig,
    pub portfolio: PortfolioConfig,
    pub warming: WarmingConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub default_ttl_seconds: u64,
    pub main_page_ttl_seconds: u64,
    pub main_page_sliding_seconds: u64,
    pub cleanup_interval_seconds: u64,
}

/// Upper bound for the contact form time-trap thresholds: one week.
pub const MAX_FORM_AGE_LIMIT_SECONDS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub min_fill_seconds: u64,
    pub max_form_age_seconds: u64,
    pub success_redirect: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub manifest_path: PathBuf,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub http_cache_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmingConfig {
    pub enabled: bool,
    pub startup_enabled: bool,
    pub warm_on_reload: bool,
    pub startup_delay_seconds: u64,
    pub interval_hours: u64,
    pub concurrent_requests: usize,
    pub request_timeout_seconds: u64,
    pub base_url: String,
    pub crop_sizes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub max_age_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            contact: ContactConfig::default(),
            portfolio: PortfolioConfig::default(),
            warming: WarmingConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:./studio.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            connection_timeout_seconds: 30,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 1800,
            main_page_ttl_seconds: 1800,
            main_page_sliding_seconds: 600,
            cleanup_interval_seconds: 300,
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 500,
            min_fill_seconds: 3,
            max_form_age_seconds: 3600,
            success_redirect: "/contact/form?sent=1".to_string(),
        }
    }
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from("./media/portfolio.json"),
            default_page_size: 8,
            max_page_size: 50,
            http_cache_seconds: 1800,
        }
    }
}

impl Default for WarmingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            startup_enabled: true,
            warm_on_reload: true,
            startup_delay_seconds: 10,
            interval_hours: 6,
            concurrent_requests: 3,
            request_timeout_seconds: 30,
            base_url: "http://127.0.0.1:3000".to_string(),
            crop_sizes: vec![
                "small".to_string(),
                "medium".to_string(),
                "large".to_string(),
            ],
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            max_age_seconds: 3600,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("warming.crop_sizes")
                .with_list_parse_key("cors.allowed_origins")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.database.url.is_empty() {
            return Err(ConfigError::Message(
                "Database URL cannot be empty".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "Database max connections must be greater than 0".to_string(),
            ));
        }

        if self.cache.default_ttl_seconds == 0 || self.cache.main_page_ttl_seconds == 0 {
            return Err(ConfigError::Message(
                "Cache TTLs must be greater than 0".to_string(),
            ));
        }

        if self.contact.max_page_size == 0 || self.portfolio.max_page_size == 0 {
            return Err(ConfigError::Message(
                "Max page sizes must be greater than 0".to_string(),
            ));
        }

        if self.contact.default_page_size == 0
            || self.contact.default_page_size > self.contact.max_page_size
            || self.portfolio.default_page_size == 0
            || self.portfolio.default_page_size > self.portfolio.max_page_size
        {
            return Err(ConfigError::Message(
                "Default page sizes must be between 1 and the max page size".to_string(),
            ));
        }

        if self.contact.max_form_age_seconds > MAX_FORM_AGE_LIMIT_SECONDS {
            return Err(ConfigError::Message(format!(
                "Contact max form age cannot exceed {} seconds",
                MAX_FORM_AGE_LIMIT_SECONDS
            )));
        }

        if self.contact.min_fill_seconds >= self.contact.max_form_age_seconds {
            return Err(ConfigError::Message(
                "Contact min fill time must be shorter than the max form age".to_string(),
            ));
        }

        if self.warming.concurrent_requests == 0 {
            return Err(ConfigError::Message(
                "Warming concurrency must be greater than 0".to_string(),
            ));
        }

        if self.warming.interval_hours == 0 {
            return Err(ConfigError::Message(
                "Warming interval must be greater than 0".to_string(),
            ));
        }

        if self.warming.base_url.is_empty() {
            return Err(ConfigError::Message(
                "Warming base URL cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
