use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Platform API error: {0}")]
    Platform(#[from] PlatformApiError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Operation timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// Whether the next scheduled cycle is likely to succeed where this
    /// call failed. Transient failures are logged quietly and left for
    /// the next sweep; everything else gets full volume.
    pub fn is_transient(&self) -> bool {
        match self {
            CoreError::Platform(e) => matches!(
                e,
                PlatformApiError::RateLimitExceeded { .. }
                    | PlatformApiError::RequestTimeout
                    | PlatformApiError::ServerError { .. }
            ),
            CoreError::Generation(e) => matches!(
                e,
                GenerationError::RequestTimeout { .. } | GenerationError::ServiceUnavailable { .. }
            ),
            CoreError::Network(e) => e.is_timeout() || e.is_connect(),
            CoreError::Timeout { .. } => true,
            _ => false,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum PlatformApiError {
    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Post not found: {post_id}")]
    PostNotFound { post_id: String },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Record already exists: {key}")]
    AlreadyExists { key: String },

    #[error("Record encoding failed: {details}")]
    Encoding { details: String },

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Engine returned an empty completion")]
    EmptyCompletion,

    #[error("Could not parse action response: {details}")]
    InvalidActionResponse { details: String },

    #[error("Request timeout for {provider}")]
    RequestTimeout { provider: String },

    #[error("Provider service unavailable: {provider}")]
    ServiceUnavailable { provider: String },

    #[error("Invalid response format from {provider}")]
    InvalidResponseFormat { provider: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let rate_limited =
            CoreError::Platform(PlatformApiError::RateLimitExceeded { retry_after: 60 });
        assert!(rate_limited.is_transient());

        let timeout = CoreError::Timeout { seconds: 30 };
        assert!(timeout.is_transient());

        let missing = CoreError::Platform(PlatformApiError::PostNotFound {
            post_id: "p1".to_string(),
        });
        assert!(!missing.is_transient());

        let config = CoreError::Config(ConfigError::ValidationFailed {
            reason: "bad interval".to_string(),
        });
        assert!(!config.is_transient());
    }

    #[test]
    fn test_error_conversion_chain() {
        let store_err = StoreError::AlreadyExists {
            key: "post:p1-agent".to_string(),
        };
        let core: CoreError = store_err.into();
        assert!(core.to_string().contains("already exists"));
    }
}
