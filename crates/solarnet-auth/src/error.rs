//! Error types for SNWS2 request signing.
//!
//! All signing failures are represented by [`AuthError`]. Signing itself is a
//! pure computation, so the variants cover bad caller input and the missing
//! or expired cached key precondition.

use chrono::{DateTime, Utc};

/// Errors that can occur while configuring or signing a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A saved-key signature was requested but no key has been saved.
    #[error("no saved signing key available")]
    MissingSigningKey,

    /// A saved-key signature was requested but the saved key has expired.
    #[error("saved signing key expired at {0}")]
    SigningKeyExpired(DateTime<Utc>),

    /// The URL passed to the builder could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header value cannot be represented as an HTTP header.
    #[error("invalid value for header {0}")]
    InvalidHeaderValue(String),

    /// A signing key could not be decoded.
    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    /// A date string could not be parsed.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The `Authorization` header could not be parsed.
    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    /// The `Authorization` header uses a scheme other than `SNWS2`.
    #[error("Unsupported authorization scheme: {0}")]
    UnsupportedScheme(String),

    /// A request attribute is outside what the API accepts.
    #[error(transparent)]
    Core(#[from] solarnet_core::SolarNetError),
}
