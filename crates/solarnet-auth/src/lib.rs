//! SNWS2 request signing for SolarNetwork API clients.
//!
//! SolarNetwork authenticates API requests with the `SNWS2` scheme: the
//! client builds a canonical form of the request (method, path, sorted query
//! parameters, selected headers, and the body digest), hashes it into a
//! string to sign, and signs that with an HMAC-SHA256 key derived from the
//! token secret and the request date. The resulting header looks like:
//!
//! ```text
//! SNWS2 Credential=<token>,SignedHeaders=date;host,Signature=<64 hex chars>
//! ```
//!
//! # Usage
//!
//! ```rust
//! use solarnet_auth::AuthorizationBuilder;
//! use solarnet_core::HttpMethod;
//!
//! let mut auth = AuthorizationBuilder::new("my-token");
//! auth.save_signing_key("my-token-secret");
//!
//! auth.reset()
//!     .method(HttpMethod::Get)
//!     .url("https://data.solarnetwork.net/solarquery/api/v1/sec/datum/list?nodeId=1", true)
//!     .unwrap();
//! let header = auth.build_with_saved_key().unwrap();
//! assert!(header.starts_with("SNWS2 Credential=my-token,"));
//! ```
//!
//! # Modules
//!
//! - [`authorization`] - The reusable [`AuthorizationBuilder`]
//! - [`canonical`] - Canonical request and string-to-sign construction
//! - [`date`] - HTTP-date and ISO 8601 basic renderings
//! - [`error`] - Signing error types
//! - [`headers`] - Ordered multi-value map for headers and query parameters
//! - [`parse`] - `Authorization` header parsing
//! - [`signing_key`] - Signing key derivation and expiration

pub mod authorization;
pub mod canonical;
pub mod date;
pub mod error;
pub mod headers;
pub mod parse;
pub mod signing_key;

pub use authorization::AuthorizationBuilder;
pub use error::AuthError;
pub use headers::MultiValueMap;
pub use parse::{ParsedAuthorization, parse_authorization_header};
pub use signing_key::{CachedSigningKey, SigningKey, derive_signing_key, signing_key_expiration};
