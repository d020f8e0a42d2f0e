//! Common type definitions shared across the SolarNetwork client crates.

use std::fmt;
use std::str::FromStr;

use crate::SolarNetError;

/// HTTP verbs accepted by the SolarNetwork API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    #[default]
    Get,
    /// `HEAD`
    Head,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `TRACE`
    Trace,
}

impl HttpMethod {
    /// All supported methods.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Head,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Options,
        Self::Trace,
    ];

    /// The upper-case verb as it appears on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = SolarNetError;

    /// Parse a verb, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SolarNetError::UnsupportedMethod(s.to_owned()))
    }
}

/// The network location of a SolarNetwork API deployment.
///
/// Requests are signed against the `Host` value derived from this
/// environment, so it must describe the externally visible address the
/// server sees, not necessarily the address the client connects to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvironment {
    /// Host name, without port.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Whether the API is reached over TLS.
    pub tls: bool,
}

impl ApiEnvironment {
    /// Default public SolarNetwork host.
    pub const DEFAULT_HOST: &str = "data.solarnetwork.net";

    /// Create an environment for the given host, port, and TLS flag.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, tls: bool) -> Self {
        Self {
            host: host.into(),
            port,
            tls,
        }
    }

    /// Create an environment using the implicit port of the protocol.
    #[must_use]
    pub fn with_default_port(host: impl Into<String>, tls: bool) -> Self {
        Self::new(host, Self::default_port_for(tls), tls)
    }

    /// The implicit port for the protocol: 443 with TLS, 80 without.
    #[must_use]
    pub fn default_port_for(tls: bool) -> u16 {
        if tls { 443 } else { 80 }
    }

    /// URL scheme for this environment.
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        if self.tls { "https" } else { "http" }
    }

    /// Whether the configured port is the implicit port of the protocol.
    #[must_use]
    pub fn is_default_port(&self) -> bool {
        self.port == Self::default_port_for(self.tls)
    }

    /// Base URL, e.g. `https://data.solarnetwork.net`.
    ///
    /// The port is included only when it is not the protocol default.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.is_default_port() {
            format!("{}://{}", self.scheme(), self.host)
        } else {
            format!("{}://{}:{}", self.scheme(), self.host, self.port)
        }
    }
}

impl Default for ApiEnvironment {
    fn default() -> Self {
        Self::with_default_port(Self::DEFAULT_HOST, true)
    }
}
