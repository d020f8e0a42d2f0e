//! The reusable SNWS2 `Authorization` header builder.
//!
//! [`AuthorizationBuilder`] holds two independent pieces of state:
//!
//! 1. The request being signed (method, path, date, headers, query
//!    parameters, content digest, extra signed header names). [`reset`]
//!    restores this to its defaults.
//! 2. An optional cached signing key with its expiration. This survives
//!    [`reset`], so one builder can sign many requests for the same token
//!    without re-deriving the key from the secret each time.
//!
//! A builder is configured then signed through `&mut self`, so one instance
//! cannot sign two requests at once. Use one builder per in-flight request,
//! sharing a key through [`AuthorizationBuilder::signing_key`] and
//! [`AuthorizationBuilder::set_signing_key`] if needed.
//!
//! [`reset`]: AuthorizationBuilder::reset

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use sha2::{Digest, Sha256};
use solarnet_core::{ApiEnvironment, HttpMethod};
use tracing::debug;

use crate::canonical::{
    SN_DATE_HEADER, build_canonical_headers, build_canonical_query_string,
    build_canonical_request, build_signed_headers_string, build_string_to_sign,
    canonical_header_names, content_digest_hex,
};
use crate::date::http_date;
use crate::error::AuthError;
use crate::headers::MultiValueMap;
use crate::signing_key::{CachedSigningKey, SigningKey, compute_signature, derive_signing_key};

/// Authorization scheme name at the start of the header value.
pub const SNWS2_SCHEME: &str = "SNWS2";

/// `Host` header name.
pub const HOST: &str = "Host";
/// `Date` header name.
pub const DATE: &str = "Date";
/// `X-SN-Date` header name.
pub const X_SN_DATE: &str = "X-SN-Date";
/// `Content-Type` header name.
pub const CONTENT_TYPE: &str = "Content-Type";
/// `Digest` header name.
pub const DIGEST: &str = "Digest";

/// The per-request portion of the builder state.
#[derive(Debug, Clone)]
struct RequestConfig {
    method: HttpMethod,
    path: String,
    date: DateTime<Utc>,
    headers: MultiValueMap,
    query_params: MultiValueMap,
    content_digest: Option<Vec<u8>>,
    signed_header_names: Option<Vec<String>>,
}

impl RequestConfig {
    fn new(date: DateTime<Utc>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: "/".to_owned(),
            date,
            headers: MultiValueMap::case_insensitive(),
            query_params: MultiValueMap::case_insensitive(),
            content_digest: None,
            signed_header_names: None,
        }
    }
}

/// Host, path, and decoded query parameters taken from a URI.
#[derive(Debug)]
struct RequestTarget {
    host: Option<String>,
    path: String,
    query_params: Vec<(String, String)>,
}

/// Builds SNWS2 `Authorization` header values.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use solarnet_auth::AuthorizationBuilder;
/// use solarnet_core::HttpMethod;
///
/// let mut auth = AuthorizationBuilder::new("my-token");
/// auth.method(HttpMethod::Get)
///     .path("/solarquery/api/v1/sec/datum/list")
///     .query_param("nodeId", "123")
///     .date(Utc.with_ymd_and_hms(2017, 3, 1, 12, 0, 0).unwrap());
///
/// let header = auth.build("my-token-secret");
/// assert!(header.starts_with("SNWS2 Credential=my-token,SignedHeaders=date;host,Signature="));
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizationBuilder {
    token_id: String,
    environment: ApiEnvironment,
    force_host_port: bool,
    request: RequestConfig,
    cached_key: Option<CachedSigningKey>,
}

impl AuthorizationBuilder {
    /// Create a builder for `token_id` against the default public environment.
    #[must_use]
    pub fn new(token_id: impl Into<String>) -> Self {
        Self::with_environment(token_id, ApiEnvironment::default())
    }

    /// Create a builder for `token_id` against `environment`.
    #[must_use]
    pub fn with_environment(token_id: impl Into<String>, environment: ApiEnvironment) -> Self {
        let mut builder = Self {
            token_id: token_id.into(),
            environment,
            force_host_port: false,
            request: RequestConfig::new(Utc::now()),
            cached_key: None,
        };
        builder.reset();
        builder
    }

    /// Restore the request defaults: `GET /` dated now, with no headers other
    /// than `Host`, no query parameters, no content digest, and no extra
    /// signed header names.
    ///
    /// Any saved signing key is kept.
    pub fn reset(&mut self) -> &mut Self {
        self.request = RequestConfig::new(Utc::now());
        self.apply_environment_host();
        self
    }

    /// The token identifier placed in the `Credential` component.
    #[must_use]
    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// The environment used for the default `Host` header.
    #[must_use]
    pub fn environment(&self) -> &ApiEnvironment {
        &self.environment
    }

    // ----- request configuration -----

    /// Set the HTTP method.
    pub fn method(&mut self, method: HttpMethod) -> &mut Self {
        self.request.method = method;
        self
    }

    /// Set the request path.
    ///
    /// The path is signed exactly as given, so it must already be
    /// percent-encoded the way it will appear on the wire.
    pub fn path(&mut self, path: impl Into<String>) -> &mut Self {
        self.request.path = path.into();
        self
    }

    /// Set the request date used for the date header and the signature.
    pub fn date(&mut self, date: DateTime<Utc>) -> &mut Self {
        self.request.date = date;
        self
    }

    /// Set the `Host` header value.
    ///
    /// With `force_host_port` enabled and a non-default environment port,
    /// `:port` is appended.
    pub fn host(&mut self, host: impl Into<String>) -> &mut Self {
        let host = host.into();
        let host = if self.force_host_port && !self.environment.is_default_port() {
            format!("{host}:{}", self.environment.port)
        } else {
            host
        };
        self.request.headers.put(HOST, host);
        self
    }

    /// Set the host, path, and optionally the query parameters from a full URL.
    ///
    /// The URL port is kept in the `Host` value when it is not the scheme's
    /// default port, or always when `force_host_port` is enabled. Query
    /// parameters are decoded before they are stored. The builder is left
    /// untouched if the URL cannot be parsed.
    pub fn url(&mut self, url: &str, include_query_params: bool) -> Result<&mut Self, AuthError> {
        let uri: http::Uri = url
            .parse()
            .map_err(|e: http::uri::InvalidUri| AuthError::InvalidUrl(format!("{url}: {e}")))?;
        if uri.authority().is_none() {
            return Err(AuthError::InvalidUrl(format!("{url}: missing host")));
        }
        let target = self.request_target(&uri);
        Ok(self.apply_target(target, include_query_params))
    }

    /// Set the `Content-Type` header.
    pub fn content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.request.headers.put(CONTENT_TYPE, content_type);
        self
    }

    /// Set the raw SHA-256 digest of the request body; `None` signs an empty body.
    pub fn content_sha256(&mut self, digest: Option<Vec<u8>>) -> &mut Self {
        self.request.content_digest = digest;
        self
    }

    /// Compute the SHA-256 digest of `body` and set the `Digest` header to
    /// `sha-256=<base64>`.
    ///
    /// The same `Digest` header must be sent with the request.
    pub fn compute_content_digest(&mut self, body: &[u8]) -> &mut Self {
        let digest = Sha256::digest(body).to_vec();
        let header_value = format!("sha-256={}", BASE64.encode(&digest));
        self.request.headers.put(DIGEST, header_value);
        self.request.content_digest = Some(digest);
        self
    }

    /// Append a header value.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.request.headers.add(name, value);
        self
    }

    /// Replace all values of a header.
    pub fn put_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.request.headers.put(name, value);
        self
    }

    /// Remove a header.
    pub fn remove_header(&mut self, name: &str) -> &mut Self {
        self.request.headers.remove(name);
        self
    }

    /// Replace the whole header container.
    ///
    /// Header names always compare case-insensitively, so a case-sensitive
    /// map is folded into a case-insensitive one.
    pub fn headers(&mut self, headers: MultiValueMap) -> &mut Self {
        self.request.headers = if headers.is_case_insensitive() {
            headers
        } else {
            let mut folded = MultiValueMap::case_insensitive();
            folded.merge(&headers);
            folded
        };
        self
    }

    /// Append a query parameter value.
    pub fn query_param(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.request.query_params.add(key, value);
        self
    }

    /// Merge decoded query parameters into the existing ones.
    pub fn query_params<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.request.query_params.extend(params);
        self
    }

    /// Sign `X-SN-Date` instead of `Date`.
    ///
    /// Enabling adds `X-SN-Date` to the extra signed header names. Disabling
    /// removes it from that list and clears any `X-SN-Date` header value.
    pub fn use_sn_date(&mut self, enabled: bool) -> &mut Self {
        let is_sn_date = |name: &String| name.eq_ignore_ascii_case(SN_DATE_HEADER);
        if enabled {
            let names = self.request.signed_header_names.get_or_insert_with(Vec::new);
            if !names.iter().any(is_sn_date) {
                names.push(X_SN_DATE.to_owned());
            }
        } else {
            if let Some(names) = self.request.signed_header_names.as_mut() {
                names.retain(|name| !is_sn_date(name));
            }
            if self
                .request
                .signed_header_names
                .as_ref()
                .is_some_and(Vec::is_empty)
            {
                self.request.signed_header_names = None;
            }
            self.request.headers.remove(X_SN_DATE);
        }
        self
    }

    /// Set the extra header names to sign beyond the mandatory set.
    pub fn signed_http_headers(&mut self, names: Option<Vec<String>>) -> &mut Self {
        self.request.signed_header_names = names;
        self
    }

    /// Include the environment port in `Host` even when proxied.
    ///
    /// When enabled, a non-default environment port is appended by
    /// [`Self::host`] and by [`Self::reset`]. A `Host` already configured is
    /// left as is.
    pub fn force_host_port(&mut self, force: bool) -> &mut Self {
        self.force_host_port = force;
        self
    }

    /// Take the method, path, query parameters, and headers of an outgoing
    /// request.
    ///
    /// A relative request URI keeps the current `Host`.
    pub fn request_parts(&mut self, parts: &http::request::Parts) -> Result<&mut Self, AuthError> {
        let method: HttpMethod = parts.method.as_str().parse()?;
        let mut headers = MultiValueMap::case_insensitive();
        for (name, value) in &parts.headers {
            let value = value
                .to_str()
                .map_err(|_| AuthError::InvalidHeaderValue(name.as_str().to_owned()))?;
            headers.add(name.as_str(), value);
        }
        let target = self.request_target(&parts.uri);

        self.request.method = method;
        for (name, values) in headers.iter() {
            self.request.headers.remove(name);
            for value in values {
                self.request.headers.add(name, value.as_str());
            }
        }
        Ok(self.apply_target(target, true))
    }

    // ----- request accessors -----

    /// The configured HTTP method.
    #[must_use]
    pub fn request_method(&self) -> HttpMethod {
        self.request.method
    }

    /// The configured request path.
    #[must_use]
    pub fn request_path(&self) -> &str {
        &self.request.path
    }

    /// The configured request date.
    #[must_use]
    pub fn request_date(&self) -> DateTime<Utc> {
        self.request.date
    }

    /// The request date as the HTTP-date to send in `Date` or `X-SN-Date`.
    #[must_use]
    pub fn request_date_header_value(&self) -> String {
        http_date(&self.request.date)
    }

    /// The configured headers.
    #[must_use]
    pub fn http_headers(&self) -> &MultiValueMap {
        &self.request.headers
    }

    /// The configured query parameters.
    #[must_use]
    pub fn request_query_params(&self) -> &MultiValueMap {
        &self.request.query_params
    }

    /// The `Digest` header value set by [`Self::compute_content_digest`].
    #[must_use]
    pub fn digest_header_value(&self) -> Option<&str> {
        self.request.headers.first_value(DIGEST)
    }

    /// Whether `X-SN-Date` is signed instead of `Date`.
    #[must_use]
    pub fn is_using_sn_date(&self) -> bool {
        self.request
            .signed_header_names
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n.eq_ignore_ascii_case(SN_DATE_HEADER)))
    }

    /// Whether the environment port is forced into `Host`.
    #[must_use]
    pub fn is_force_host_port(&self) -> bool {
        self.force_host_port
    }

    // ----- signing key management -----

    /// Derive a signing key for the configured request date without saving it.
    #[must_use]
    pub fn compute_signing_key(&self, secret: &str) -> SigningKey {
        derive_signing_key(secret, &self.request.date)
    }

    /// Derive a signing key for the configured request date and save it.
    pub fn save_signing_key(&mut self, secret: &str) -> &mut Self {
        let key = self.compute_signing_key(secret);
        let cached = CachedSigningKey::new(key, &self.request.date);
        debug!(
            token_id = %self.token_id,
            expiration = %cached.expiration,
            "Saved signing key"
        );
        self.cached_key = Some(cached);
        self
    }

    /// Save an externally obtained signing key.
    ///
    /// The expiration is computed from `date` the same way as for a derived
    /// key, using the current time when `date` is `None`.
    pub fn set_signing_key(&mut self, key: SigningKey, date: Option<DateTime<Utc>>) -> &mut Self {
        let date = date.unwrap_or_else(Utc::now);
        self.cached_key = Some(CachedSigningKey::new(key, &date));
        self
    }

    /// Discard any saved signing key.
    pub fn clear_signing_key(&mut self) -> &mut Self {
        self.cached_key = None;
        self
    }

    /// The saved signing key.
    #[must_use]
    pub fn signing_key(&self) -> Option<&SigningKey> {
        self.cached_key.as_ref().map(|c| &c.key)
    }

    /// The expiration of the saved signing key.
    #[must_use]
    pub fn signing_key_expiration(&self) -> Option<DateTime<Utc>> {
        self.cached_key.as_ref().map(|c| c.expiration)
    }

    /// Whether a saved signing key exists and has not expired as of now.
    #[must_use]
    pub fn signing_key_valid(&self) -> bool {
        self.signing_key_valid_at(&Utc::now())
    }

    /// Whether a saved signing key exists and has not expired as of `now`.
    #[must_use]
    pub fn signing_key_valid_at(&self, now: &DateTime<Utc>) -> bool {
        self.cached_key.as_ref().is_some_and(|c| c.is_valid_at(now))
    }

    // ----- signing -----

    /// The sorted, lower-cased header names that will be signed.
    #[must_use]
    pub fn canonical_header_names(&self) -> Vec<String> {
        canonical_header_names(
            &self.request.headers,
            self.is_using_sn_date(),
            self.request.signed_header_names.as_deref(),
        )
    }

    /// The canonical request for the current configuration.
    #[must_use]
    pub fn build_canonical_request_data(&self) -> String {
        self.canonical_request(&self.canonical_header_names())
    }

    /// The string to sign for the current configuration.
    #[must_use]
    pub fn build_string_to_sign(&self) -> String {
        build_string_to_sign(&self.request.date, &self.build_canonical_request_data())
    }

    /// Derive a fresh key from `secret` and sign, without saving the key.
    #[must_use]
    pub fn build(&self, secret: &str) -> String {
        self.build_with_key(&self.compute_signing_key(secret))
    }

    /// Sign with `key`.
    #[must_use]
    pub fn build_with_key(&self, key: &SigningKey) -> String {
        let names = self.canonical_header_names();
        let canonical_request = self.canonical_request(&names);
        debug!(canonical_request, "Built canonical request");

        let string_to_sign = build_string_to_sign(&self.request.date, &canonical_request);
        debug!(string_to_sign, "Built string to sign");

        let signature = compute_signature(key, &string_to_sign);
        format!(
            "{SNWS2_SCHEME} Credential={},SignedHeaders={},Signature={signature}",
            self.token_id,
            build_signed_headers_string(&names)
        )
    }

    /// Sign with the saved key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingSigningKey`] when no key has been saved and
    /// [`AuthError::SigningKeyExpired`] when the saved key has expired.
    pub fn build_with_saved_key(&self) -> Result<String, AuthError> {
        self.build_with_saved_key_at(&Utc::now())
    }

    /// Sign with the saved key, checking its validity as of `now`.
    pub fn build_with_saved_key_at(&self, now: &DateTime<Utc>) -> Result<String, AuthError> {
        let cached = self
            .cached_key
            .as_ref()
            .ok_or(AuthError::MissingSigningKey)?;
        if !cached.is_valid_at(now) {
            debug!(
                token_id = %self.token_id,
                expiration = %cached.expiration,
                "Saved signing key has expired"
            );
            return Err(AuthError::SigningKeyExpired(cached.expiration));
        }
        Ok(self.build_with_key(&cached.key))
    }

    /// Write the signed headers and `authorization` into `headers`.
    ///
    /// Every configured header is copied, the date header is set to the
    /// request date, and `Authorization` is set, so the headers sent on the
    /// wire match the ones that were signed. Only one of `Date` and
    /// `X-SN-Date` is sent.
    pub fn apply_to_headers(
        &self,
        headers: &mut HeaderMap,
        authorization: &str,
    ) -> Result<(), AuthError> {
        let (date_name, unused_date_name) = if self.is_using_sn_date() {
            (X_SN_DATE, DATE)
        } else {
            (DATE, X_SN_DATE)
        };
        headers.remove(unused_date_name);

        for (name, values) in self.request.headers.iter() {
            if name.eq_ignore_ascii_case(unused_date_name) {
                continue;
            }
            let header_name = header_name(name)?;
            headers.remove(&header_name);
            for value in values {
                headers.append(header_name.clone(), header_value(name, value)?);
            }
        }

        headers.insert(
            header_name(date_name)?,
            header_value(date_name, &self.request_date_header_value())?,
        );
        headers.insert(
            http::header::AUTHORIZATION,
            header_value("Authorization", authorization)?,
        );
        Ok(())
    }

    // ----- internals -----

    fn canonical_request(&self, sorted_names: &[String]) -> String {
        build_canonical_request(
            self.request.method.as_str(),
            &self.request.path,
            &build_canonical_query_string(&self.request.query_params),
            &build_canonical_headers(sorted_names, &self.request.headers, &self.request.date),
            &build_signed_headers_string(sorted_names),
            &content_digest_hex(self.request.content_digest.as_deref()),
        )
    }

    fn apply_environment_host(&mut self) {
        let host = self.environment.host.clone();
        self.host(host);
    }

    fn request_target(&self, uri: &http::Uri) -> RequestTarget {
        let host = uri.host().map(|host| {
            let tls = uri.scheme_str() == Some("https");
            match uri.port_u16() {
                Some(port)
                    if self.force_host_port || port != ApiEnvironment::default_port_for(tls) =>
                {
                    format!("{host}:{port}")
                }
                _ => host.to_owned(),
            }
        });
        let query_params: Vec<(String, String)> = uri
            .query()
            .map(|query| {
                form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        RequestTarget {
            host,
            path: uri.path().to_owned(),
            query_params,
        }
    }

    fn apply_target(&mut self, target: RequestTarget, include_query_params: bool) -> &mut Self {
        if let Some(host) = target.host {
            self.request.headers.put(HOST, host);
        }
        if include_query_params {
            self.query_params(target.query_params);
        }
        self.path(target.path)
    }
}

fn header_name(name: &str) -> Result<HeaderName, AuthError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| AuthError::InvalidHeaderValue(name.to_owned()))
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_str(value).map_err(|_| AuthError::InvalidHeaderValue(name.to_owned()))
}
