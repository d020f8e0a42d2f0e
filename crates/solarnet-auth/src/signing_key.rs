//! SNWS2 signing key derivation and expiration.
//!
//! A signing key is derived from the token secret and a signing date:
//!
//! ```text
//! DateKey    = HMAC-SHA256("SNWS2" + secret, yyyyMMdd)
//! SigningKey = HMAC-SHA256(DateKey, "snws2_request")
//! ```
//!
//! A derived key can be reused until 00:00:00 UTC of the day seven days
//! after the signing date, so the secret itself is not needed per request.

use std::fmt;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::date::iso8601_basic_date;
use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Prefix joined to the token secret to form the date key.
const KEY_PREFIX: &str = "SNWS2";

/// Final message of the derivation chain.
const KEY_REQUEST_TERMINATOR: &[u8] = b"snws2_request";

/// Number of days a derived key remains valid.
pub const SIGNING_KEY_VALIDITY_DAYS: i64 = 7;

/// An opaque SNWS2 signing key.
///
/// `Debug` output never includes the key material, and equality is checked
/// in constant time.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Wrap raw key bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode a hex-encoded key, e.g. one returned by a token refresh.
    pub fn from_hex(value: &str) -> Result<Self, AuthError> {
        hex::decode(value.trim())
            .map(Self)
            .map_err(|e| AuthError::InvalidSigningKey(e.to_string()))
    }

    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lower-case hex encoding of the key.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

impl PartialEq for SigningKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice().ct_eq(other.0.as_slice()).into()
    }
}

impl Eq for SigningKey {}

/// A signing key together with the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSigningKey {
    /// The key.
    pub key: SigningKey,
    /// The key is valid strictly before this instant.
    pub expiration: DateTime<Utc>,
}

impl CachedSigningKey {
    /// Pair `key` with the expiration derived from `signing_date`.
    #[must_use]
    pub fn new(key: SigningKey, signing_date: &DateTime<Utc>) -> Self {
        Self {
            key,
            expiration: signing_key_expiration(signing_date),
        }
    }

    /// Whether the key can still be used at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: &DateTime<Utc>) -> bool {
        *now < self.expiration
    }
}

/// Derive the SNWS2 signing key for `secret` and the UTC day of `signing_date`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use solarnet_auth::signing_key::derive_signing_key;
///
/// let date = Utc.with_ymd_and_hms(2017, 3, 1, 12, 0, 0).unwrap();
/// let key = derive_signing_key("my-token-secret", &date);
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
#[must_use]
pub fn derive_signing_key(secret: &str, signing_date: &DateTime<Utc>) -> SigningKey {
    let date_key = hmac_sha256(
        format!("{KEY_PREFIX}{secret}").as_bytes(),
        iso8601_basic_date(signing_date).as_bytes(),
    );
    SigningKey(hmac_sha256(&date_key, KEY_REQUEST_TERMINATOR))
}

/// The instant a key derived for `signing_date` expires.
///
/// This is `signing_date` plus seven days, truncated to 00:00:00.000 UTC of
/// that day.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use solarnet_auth::signing_key::signing_key_expiration;
///
/// let date = Utc.with_ymd_and_hms(2017, 3, 1, 12, 0, 0).unwrap();
/// let expected = Utc.with_ymd_and_hms(2017, 3, 8, 0, 0, 0).unwrap();
/// assert_eq!(signing_key_expiration(&date), expected);
/// ```
#[must_use]
pub fn signing_key_expiration(signing_date: &DateTime<Utc>) -> DateTime<Utc> {
    let later = *signing_date + Duration::days(SIGNING_KEY_VALIDITY_DAYS);
    later.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Compute the HMAC-SHA256 of `string_to_sign` with `key` as lower-case hex.
#[must_use]
pub fn compute_signature(key: &SigningKey, string_to_sign: &str) -> String {
    hex::encode(hmac_sha256(key.as_bytes(), string_to_sign.as_bytes()))
}

/// Compute HMAC-SHA256 and return the raw bytes.
fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
