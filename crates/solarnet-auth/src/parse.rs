//! Parsing of SNWS2 `Authorization` header values.
//!
//! Used to inspect a header produced by [`crate::AuthorizationBuilder`], e.g.
//! when logging which token and headers a request was signed with.

use tracing::debug;

use crate::authorization::SNWS2_SCHEME;
use crate::error::AuthError;

/// Parsed components of an SNWS2 `Authorization` header.
///
/// Format:
/// ```text
/// SNWS2 Credential=<token>,SignedHeaders=date;host,Signature=<hex-signature>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAuthorization {
    /// The token identifier.
    pub token_id: String,
    /// The list of signed header names (lowercase).
    pub signed_headers: Vec<String>,
    /// The hex-encoded signature.
    pub signature: String,
}

/// Parse an SNWS2 `Authorization` header value into its components.
///
/// # Errors
///
/// Returns [`AuthError::InvalidAuthHeader`] if a component is missing, or
/// [`AuthError::UnsupportedScheme`] if the scheme is not `SNWS2`.
///
/// # Examples
///
/// ```
/// use solarnet_auth::parse_authorization_header;
///
/// let parsed = parse_authorization_header(
///     "SNWS2 Credential=my-token,SignedHeaders=date;host,Signature=abc123",
/// )
/// .unwrap();
/// assert_eq!(parsed.token_id, "my-token");
/// assert_eq!(parsed.signed_headers, ["date", "host"]);
/// ```
pub fn parse_authorization_header(header: &str) -> Result<ParsedAuthorization, AuthError> {
    let (scheme, rest) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;

    if scheme != SNWS2_SCHEME {
        return Err(AuthError::UnsupportedScheme(scheme.to_owned()));
    }

    let mut credential = None;
    let mut signed_headers = None;
    let mut signature = None;

    for part in rest.split(',') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("Credential=") {
            credential = Some(value);
        } else if let Some(value) = part.strip_prefix("SignedHeaders=") {
            signed_headers = Some(value);
        } else if let Some(value) = part.strip_prefix("Signature=") {
            signature = Some(value);
        }
    }

    let credential = credential
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)?;
    let signed_headers = signed_headers
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)?;
    let signature = signature
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)?;

    debug!(token_id = credential, signed_headers, "Parsed SNWS2 authorization header");

    Ok(ParsedAuthorization {
        token_id: credential.to_owned(),
        signed_headers: signed_headers.split(';').map(ToOwned::to_owned).collect(),
        signature: signature.to_owned(),
    })
}
