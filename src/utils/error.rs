use thiserror::Error;

/// What was wrong with a search API body that arrived with a success status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseDefect {
    MalformedJson,
    UnexpectedFormat,
    MissingItems,
}

impl ResponseDefect {
    pub fn describe(&self) -> &'static str {
        match self {
            ResponseDefect::MalformedJson => "잘못된 응답 형식",
            ResponseDefect::UnexpectedFormat => "예상치 못한 응답 형식",
            ResponseDefect::MissingItems => "항목을 찾을 수 없음",
        }
    }
}

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("Request timed out after {attempts} attempts")]
    TimeoutError { attempts: u32 },

    #[error("Invalid response: {}", defect.describe())]
    InvalidResponseError { defect: ResponseDefect },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Api,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl NewsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            NewsError::HttpError(_) | NewsError::TimeoutError { .. } => ErrorCategory::Network,
            NewsError::StatusError { .. } => ErrorCategory::Api,
            NewsError::InvalidResponseError { .. } | NewsError::SerializationError(_) => {
                ErrorCategory::Data
            }
            NewsError::ConfigValidationError { .. }
            | NewsError::InvalidConfigValueError { .. }
            | NewsError::MissingConfigError { .. } => ErrorCategory::Configuration,
            NewsError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Api => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            NewsError::TimeoutError { .. } => true,
            NewsError::HttpError(e) => !e.is_builder() && !e.is_decode(),
            NewsError::StatusError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            NewsError::StatusError { status, .. } => Some(*status),
            NewsError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            NewsError::TimeoutError { .. } => {
                "The news service did not answer in time".to_string()
            }
            NewsError::HttpError(_) => "Could not reach the news service".to_string(),
            NewsError::StatusError { status, .. } => {
                format!("The news service rejected the request (HTTP {})", status)
            }
            NewsError::InvalidResponseError { defect } => {
                format!("The news service returned an unusable response: {}", defect.describe())
            }
            NewsError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            NewsError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            NewsError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            NewsError::TimeoutError { .. } | NewsError::HttpError(_) => {
                "Check the network connection and try again"
            }
            NewsError::StatusError { status, .. } if *status == 401 || *status == 403 => {
                "Check NAVER_CLIENT_ID and NAVER_CLIENT_SECRET"
            }
            NewsError::StatusError { status, .. } if *status == 429 => {
                "Wait a moment before sending more requests"
            }
            NewsError::StatusError { .. } => "Retry later; the upstream service reported an error",
            NewsError::InvalidResponseError { .. } | NewsError::SerializationError(_) => {
                "Verify the configured search endpoint returns the news search JSON format"
            }
            NewsError::ConfigValidationError { .. }
            | NewsError::InvalidConfigValueError { .. }
            | NewsError::MissingConfigError { .. } => {
                "Fix the configuration file, environment variables or command line flags"
            }
            NewsError::IoError(_) => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, NewsError>;
