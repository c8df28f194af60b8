use crate::config::{LogFormat, Settings, Transport};
use crate::domain::model::SortOrder;
use crate::utils::error::{NewsError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Optional configuration file. Every section and key may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub naver: Option<NaverSection>,
    pub http: Option<HttpSection>,
    pub search: Option<SearchSection>,
    pub server: Option<ServerSection>,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NaverSection {
    pub endpoint: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpSection {
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSection {
    pub max_news_items: Option<usize>,
    pub sort: Option<SortOrder>,
    pub max_concurrent_fetches: Option<usize>,
    pub max_content_length: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub transport: Option<Transport>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    pub format: Option<LogFormat>,
    pub verbose: Option<bool>,
}

impl TomlConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(NewsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| NewsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown variables stay verbatim.
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Overlay the values present in this file onto `settings`.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(naver) = &self.naver {
            if let Some(endpoint) = resolved(&naver.endpoint) {
                settings.naver.endpoint = endpoint;
            }
            if let Some(client_id) = resolved(&naver.client_id) {
                settings.naver.client_id = client_id;
            }
            if let Some(client_secret) = resolved(&naver.client_secret) {
                settings.naver.client_secret = client_secret;
            }
        }

        if let Some(http) = &self.http {
            if let Some(timeout) = http.timeout_seconds {
                settings.http.timeout_seconds = timeout;
            }
            if let Some(attempts) = http.retry_attempts {
                settings.http.retry_attempts = attempts;
            }
            if let Some(delay) = http.retry_delay_ms {
                settings.http.retry_delay_ms = delay;
            }
        }

        if let Some(search) = &self.search {
            if let Some(max_items) = search.max_news_items {
                settings.search.max_news_items = max_items;
            }
            if let Some(sort) = search.sort {
                settings.search.sort = sort;
            }
            if let Some(concurrency) = search.max_concurrent_fetches {
                settings.search.max_concurrent_fetches = concurrency;
            }
            if let Some(length) = search.max_content_length {
                settings.search.max_content_length = length;
            }
        }

        if let Some(server) = &self.server {
            if let Some(transport) = server.transport {
                settings.server.transport = transport;
            }
            if let Some(host) = resolved(&server.host) {
                settings.server.host = host;
            }
            if let Some(port) = server.port {
                settings.server.port = port;
            }
        }
    }

    pub fn log_format(&self) -> Option<LogFormat> {
        self.logging.as_ref().and_then(|l| l.format)
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.verbose).unwrap_or(false)
    }
}

/// A value still shaped like `${VAR}` after substitution means the variable was unset.
fn resolved(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .filter(|v| !ENV_PLACEHOLDER.is_match(v))
        .cloned()
}
