use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Company registry not found at {path}")]
    MissingRegistry { path: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("Failed to parse registry page {page}: {message}")]
    PageParseError { page: u32, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => ErrorCategory::Network,
            EtlError::IoError(_) | EtlError::MissingRegistry { .. } => ErrorCategory::Storage,
            EtlError::SerializationError(_) | EtlError::PageParseError { .. } => {
                ErrorCategory::Data
            }
            EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::PageParseError { .. } => ErrorSeverity::Low,
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => ErrorSeverity::Medium,
            EtlError::SerializationError(_) => ErrorSeverity::High,
            EtlError::IoError(_)
            | EtlError::MissingRegistry { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => {
                "Check network connectivity and that the registry site is reachable, then rerun"
                    .to_string()
            }
            EtlError::MissingRegistry { .. } => {
                "Run fetch-companies first to build the company registry".to_string()
            }
            EtlError::IoError(_) => {
                "Check that the data and output directories exist and are writable".to_string()
            }
            EtlError::SerializationError(_) => {
                "One of the input JSON files is malformed; regenerate it with its scraper"
                    .to_string()
            }
            EtlError::PageParseError { .. } => {
                "The registry page layout may have changed; inspect the raw HTML".to_string()
            }
            EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => {
                "Fix the configuration value (see --help) and rerun".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingRegistry { path } => {
                format!("Company registry '{}' is missing; nothing was written", path)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            EtlError::MissingConfigError { field } => {
                format!("Required setting '{}' was not provided", field)
            }
            EtlError::HttpStatusError { status, .. } => {
                format!("The registry site answered with HTTP {}", status)
            }
            other => other.to_string(),
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_registry_is_critical() {
        let err = EtlError::MissingRegistry {
            path: "data/companies.json".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
        assert!(err.user_friendly_message().contains("data/companies.json"));
    }

    #[test]
    fn test_http_status_is_retryable() {
        let err = EtlError::HttpStatusError {
            url: "https://example.com".to_string(),
            status: 503,
        };
        assert!(err.is_retryable());
        assert_eq!(err.exit_code(), 2);
    }
}
