//! Configuration for SolarNetwork clients.
//!
//! All configuration is driven by environment variables so the same binary
//! can target the public deployment, a staging host, or a local proxy.

use serde::{Deserialize, Serialize};
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::{ApiEnvironment, SolarNetError, SolarNetResult};

/// Client configuration.
///
/// # Examples
///
/// ```
/// use solarnet_core::SolarNetConfig;
///
/// let config = SolarNetConfig::builder().host("localhost".to_owned()).port(Some(8080)).tls(false).build();
/// assert_eq!(config.environment().base_url(), "http://localhost:8080");
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct SolarNetConfig {
    /// API host name, without port.
    #[builder(default = String::from(ApiEnvironment::DEFAULT_HOST))]
    pub host: String,

    /// API port; `None` means the protocol default.
    #[builder(default)]
    pub port: Option<u16>,

    /// Whether the API is reached over TLS.
    #[builder(default = true)]
    pub tls: bool,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Security token identifier.
    #[builder(default)]
    pub token: Option<String>,

    /// Security token secret. Never serialized.
    #[serde(skip)]
    #[builder(default)]
    pub secret: Option<String>,
}

impl std::fmt::Debug for SolarNetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolarNetConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("log_level", &self.log_level)
            .field("token", &self.token)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for SolarNetConfig {
    fn default() -> Self {
        Self {
            host: String::from(ApiEnvironment::DEFAULT_HOST),
            port: None,
            tls: true,
            log_level: String::from("info"),
            token: None,
            secret: None,
        }
    }
}

impl SolarNetConfig {
    /// Load configuration from process environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SOLARNETWORK_HOST` | `data.solarnetwork.net` |
    /// | `SOLARNETWORK_PORT` | protocol default |
    /// | `SOLARNETWORK_PROTOCOL` | `https` |
    /// | `LOG_LEVEL` | `info` |
    /// | `SOLARNETWORK_TOKEN` | *(unset)* |
    /// | `SOLARNETWORK_SECRET` | *(unset)* |
    pub fn from_env() -> SolarNetResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SolarNetResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("SOLARNETWORK_HOST") {
            config.host = v;
        }
        if let Some(v) = lookup("SOLARNETWORK_PORT") {
            let port = v
                .parse::<u16>()
                .map_err(|_| SolarNetError::Config(format!("invalid SOLARNETWORK_PORT: {v}")))?;
            config.port = Some(port);
        }
        if let Some(v) = lookup("SOLARNETWORK_PROTOCOL") {
            config.tls = match v.to_ascii_lowercase().as_str() {
                "https" => true,
                "http" => false,
                _ => {
                    return Err(SolarNetError::Config(format!(
                        "invalid SOLARNETWORK_PROTOCOL: {v} (expected http or https)"
                    )));
                }
            };
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        config.token = lookup("SOLARNETWORK_TOKEN").filter(|v| !v.is_empty());
        config.secret = lookup("SOLARNETWORK_SECRET").filter(|v| !v.is_empty());

        debug!(host = %config.host, port = ?config.port, tls = config.tls, "Loaded configuration");

        Ok(config)
    }

    /// The API environment described by this configuration.
    #[must_use]
    pub fn environment(&self) -> ApiEnvironment {
        match self.port {
            Some(port) => ApiEnvironment::new(self.host.clone(), port, self.tls),
            None => ApiEnvironment::with_default_port(self.host.clone(), self.tls),
        }
    }
}
