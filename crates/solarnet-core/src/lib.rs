//! Core types, configuration, and errors for the SolarNetwork client.
//!
//! This crate provides the building blocks shared by the SolarNetwork client
//! crates: the API environment (host, port, TLS) that requests are addressed
//! to, the HTTP verb set the API accepts, and environment-driven configuration.

mod config;
mod error;
mod types;

pub use config::SolarNetConfig;
pub use error::{SolarNetError, SolarNetResult};
pub use types::{ApiEnvironment, HttpMethod};
