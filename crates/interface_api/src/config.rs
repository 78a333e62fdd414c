//! API configuration

use serde::Deserialize;
use std::time::Duration;

use core_kernel::{CoreError, Timezone};
use domain_customer::DEFAULT_PAGE_SIZE;
use infra_db::DatabaseConfig;

/// API configuration
///
/// Loaded from `API_*` environment variables, e.g. `API_PORT=9090` or
/// `API_BUSINESS_TIMEZONE=Europe/Istanbul`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// IANA timezone in which "today" is evaluated for age rules
    pub business_timezone: String,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Per-statement limit in milliseconds, 0 disables it
    pub db_statement_timeout_ms: u64,
    /// Deadline for a customer request in milliseconds, 0 disables it
    pub request_timeout_ms: u64,
    /// Listing page size when the request names none
    pub default_page_size: u32,
    /// Largest listing page size served
    pub max_page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/customers".to_string(),
            log_level: "info".to_string(),
            business_timezone: "Europe/Istanbul".to_string(),
            db_max_connections: 10,
            db_statement_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 100,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment, with defaults for unset keys
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_url", defaults.database_url)?
            .set_default("log_level", defaults.log_level)?
            .set_default("business_timezone", defaults.business_timezone)?
            .set_default("db_max_connections", i64::from(defaults.db_max_connections))?
            .set_default("db_statement_timeout_ms", defaults.db_statement_timeout_ms as i64)?
            .set_default("request_timeout_ms", defaults.request_timeout_ms as i64)?
            .set_default("default_page_size", i64::from(defaults.default_page_size))?
            .set_default("max_page_size", i64::from(defaults.max_page_size))?
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the business timezone
    pub fn timezone(&self) -> Result<Timezone, CoreError> {
        Ok(self.business_timezone.parse::<Timezone>()?)
    }

    pub fn statement_timeout(&self) -> Option<Duration> {
        (self.db_statement_timeout_ms > 0)
            .then(|| Duration::from_millis(self.db_statement_timeout_ms))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    /// Requested page size, defaulted and capped
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }

    /// Builds the pool configuration
    pub fn database_config(&self) -> DatabaseConfig {
        let config = DatabaseConfig::new(&self.database_url).max_connections(self.db_max_connections);
        match self.statement_timeout() {
            Some(timeout) => config.statement_timeout(timeout),
            None => config,
        }
    }
}
