#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::SortOrder;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_NAVER_ENDPOINT: &str = "https://openapi.naver.com/v1/search/news.json";
pub const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Clone, PartialEq, Eq)]
pub struct NaverSettings {
    pub endpoint: String,
    pub client_id: String,
    pub client_secret: String,
}

// Credentials stay out of debug logs.
impl std::fmt::Debug for NaverSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaverSettings")
            .field("endpoint", &self.endpoint)
            .field("client_id", &mask(&self.client_id))
            .field("client_secret", &mask(&self.client_secret))
            .finish()
    }
}

fn mask(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<hidden>"
    }
}

impl Default for NaverSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_NAVER_ENDPOINT.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpSettings {
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 15,
            retry_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub max_news_items: usize,
    pub sort: SortOrder,
    pub max_concurrent_fetches: usize,
    pub max_content_length: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_news_items: 20,
            sort: SortOrder::Sim,
            max_concurrent_fetches: 20,
            max_content_length: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            host: DEFAULT_HOST.to_string(),
            port: crate::release::DEFAULT_PORT,
        }
    }
}

/// Fully resolved runtime configuration: defaults, then the TOML file, then
/// environment and command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub naver: NaverSettings,
    pub http: HttpSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
}

impl Settings {
    pub fn has_credentials(&self) -> bool {
        !self.naver.client_id.trim().is_empty() && !self.naver.client_secret.trim().is_empty()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("naver.endpoint", &self.naver.endpoint)?;
        validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 300)?;
        validate_range("http.retry_attempts", self.http.retry_attempts, 1, 10)?;
        validate_range("search.max_news_items", self.search.max_news_items, 1, 100)?;
        validate_positive_number(
            "search.max_concurrent_fetches",
            self.search.max_concurrent_fetches,
            1,
        )?;
        validate_positive_number(
            "search.max_content_length",
            self.search.max_content_length,
            1,
        )?;
        validate_positive_number("server.port", self.server.port as usize, 1)?;
        Ok(())
    }
}
