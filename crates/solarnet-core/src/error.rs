//! Error types for the SolarNetwork core.

/// Core error type for SolarNetwork client infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum SolarNetError {
    /// HTTP method outside the verb set supported by the API.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for SolarNetwork operations.
pub type SolarNetResult<T> = Result<T, SolarNetError>;
