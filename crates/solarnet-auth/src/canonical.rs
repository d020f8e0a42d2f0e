//! Canonical request construction for SNWS2 signatures.
//!
//! The canonical request is the newline-separated string:
//!
//! ```text
//! HTTPRequestMethod\n
//! RequestPath\n
//! CanonicalQueryString\n
//! CanonicalHeaders (each line ending in \n)
//! SignedHeaders\n
//! ContentSHA256Hex
//! ```
//!
//! The server recomputes this string independently from the request it
//! receives, so every component must be reproduced byte for byte.

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};

use crate::date::{http_date, iso8601_basic_datetime};
use crate::headers::MultiValueMap;

/// The signature algorithm name that opens the string to sign.
pub const SNWS2_ALGORITHM: &str = "SNWS2-HMAC-SHA256";

/// Hex SHA-256 digest of the empty string, used when no content digest is set.
pub const EMPTY_STRING_SHA256_HEX: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Lower-case `host` header name.
pub const HOST_HEADER: &str = "host";
/// Lower-case `date` header name.
pub const DATE_HEADER: &str = "date";
/// Lower-case `x-sn-date` header name.
pub const SN_DATE_HEADER: &str = "x-sn-date";
/// Lower-case `content-md5` header name.
pub const CONTENT_MD5_HEADER: &str = "content-md5";
/// Lower-case `content-type` header name.
pub const CONTENT_TYPE_HEADER: &str = "content-type";
/// Lower-case `digest` header name.
pub const DIGEST_HEADER: &str = "digest";

/// Headers that are signed whenever the request carries them.
const OPTIONAL_SIGNED_HEADERS: [&str; 3] = [CONTENT_MD5_HEADER, CONTENT_TYPE_HEADER, DIGEST_HEADER];

/// Characters left literal in query keys and values.
///
/// Only RFC 3986 unreserved characters (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`)
/// pass through, so `!`, `'`, `(`, `)` and `*` are escaped too.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build the full canonical request string from its components.
///
/// `canonical_headers` must already end with a newline, as produced by
/// [`build_canonical_headers`].
///
/// # Examples
///
/// ```
/// use solarnet_auth::canonical::{EMPTY_STRING_SHA256_HEX, build_canonical_request};
///
/// let canonical = build_canonical_request(
///     "GET",
///     "/solarquery/api/v1/pub/datum/list",
///     "",
///     "date:Wed, 01 Mar 2017 12:00:00 GMT\nhost:data.solarnetwork.net\n",
///     "date;host",
///     EMPTY_STRING_SHA256_HEX,
/// );
/// assert!(canonical.starts_with("GET\n/solarquery/api/v1/pub/datum/list\n\n"));
/// ```
#[must_use]
pub fn build_canonical_request(
    method: &str,
    path: &str,
    canonical_query: &str,
    canonical_headers: &str,
    signed_headers: &str,
    content_sha256_hex: &str,
) -> String {
    format!(
        "{method}\n{path}\n{canonical_query}\n{canonical_headers}{signed_headers}\n{content_sha256_hex}"
    )
}

/// Build the canonical query string.
///
/// Keys are sorted by their raw string; the values of each key keep their
/// insertion order. Keys and values are percent-encoded with
/// [`percent_encode_component`].
///
/// # Examples
///
/// ```
/// use solarnet_auth::MultiValueMap;
/// use solarnet_auth::canonical::build_canonical_query_string;
///
/// let params: MultiValueMap = [("b", "2"), ("a", "3"), ("a", "1")].into_iter().collect();
/// assert_eq!(build_canonical_query_string(&params), "a=3&a=1&b=2");
/// ```
#[must_use]
pub fn build_canonical_query_string(params: &MultiValueMap) -> String {
    let mut keys: Vec<&str> = params.keys().collect();
    keys.sort_unstable();

    keys.iter()
        .flat_map(|key| {
            let encoded_key = percent_encode_component(key);
            params
                .values(key)
                .unwrap_or_default()
                .iter()
                .map(move |value| format!("{encoded_key}={}", percent_encode_component(value)))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Resolve the sorted, lower-cased, de-duplicated header names to sign.
///
/// Always includes `host` and one of `date` / `x-sn-date`; includes
/// `content-md5`, `content-type` and `digest` only when `headers` has them;
/// then any `extra` names.
#[must_use]
pub fn canonical_header_names(
    headers: &MultiValueMap,
    use_sn_date: bool,
    extra: Option<&[String]>,
) -> Vec<String> {
    let date_header = if use_sn_date { SN_DATE_HEADER } else { DATE_HEADER };
    let mut names: Vec<String> = vec![HOST_HEADER.to_owned(), date_header.to_owned()];

    names.extend(
        OPTIONAL_SIGNED_HEADERS
            .iter()
            .filter(|name| headers.contains_key(name))
            .map(|name| (*name).to_owned()),
    );

    if let Some(extra) = extra {
        names.extend(extra.iter().map(|name| name.to_lowercase()));
    }

    names.sort_unstable();
    names.dedup();
    names
}

/// Build the canonical headers block.
///
/// Each name in `sorted_names` produces `name:value\n`, where `value` is the
/// first value of that header with surrounding whitespace trimmed; internal
/// whitespace is kept as is. A missing header renders an empty value. The
/// `date` and `x-sn-date` headers always render `request_date` as an
/// HTTP-date, whatever the header map holds.
#[must_use]
pub fn build_canonical_headers(
    sorted_names: &[String],
    headers: &MultiValueMap,
    request_date: &DateTime<Utc>,
) -> String {
    let date_value = http_date(request_date);
    let mut result = String::new();
    for name in sorted_names {
        let value = if name == DATE_HEADER || name == SN_DATE_HEADER {
            date_value.as_str()
        } else {
            headers.first_value(name).map_or("", str::trim)
        };
        result.push_str(name);
        result.push(':');
        result.push_str(value);
        result.push('\n');
    }
    result
}

/// Build the signed headers string as a semicolon-separated list.
///
/// The names are expected to be sorted and lower-cased already.
///
/// # Examples
///
/// ```
/// use solarnet_auth::canonical::build_signed_headers_string;
///
/// let names = vec!["date".to_owned(), "host".to_owned()];
/// assert_eq!(build_signed_headers_string(&names), "date;host");
/// ```
#[must_use]
pub fn build_signed_headers_string(sorted_names: &[String]) -> String {
    sorted_names.join(";")
}

/// Hex encoding of a content digest, or [`EMPTY_STRING_SHA256_HEX`] when absent.
#[must_use]
pub fn content_digest_hex(digest: Option<&[u8]>) -> String {
    match digest {
        Some(bytes) => hex::encode(bytes),
        None => EMPTY_STRING_SHA256_HEX.to_owned(),
    }
}

/// Build the SNWS2 string to sign.
///
/// ```text
/// SNWS2-HMAC-SHA256\n
/// <yyyyMMdd'T'HHmmss'Z'>\n
/// <hex(SHA256(canonical_request))>
/// ```
#[must_use]
pub fn build_string_to_sign(request_date: &DateTime<Utc>, canonical_request: &str) -> String {
    format!(
        "{SNWS2_ALGORITHM}\n{}\n{}",
        iso8601_basic_datetime(request_date),
        sha256_hex(canonical_request.as_bytes())
    )
}

/// Percent-encode a query key or value.
///
/// # Examples
///
/// ```
/// use solarnet_auth::canonical::percent_encode_component;
///
/// assert_eq!(percent_encode_component("a'b(c)d*e!"), "a%27b%28c%29d%2Ae%21");
/// assert_eq!(percent_encode_component("2017-03-01T12:00"), "2017-03-01T12%3A00");
/// ```
#[must_use]
pub fn percent_encode_component(input: &str) -> String {
    utf8_percent_encode(input, QUERY_ENCODE_SET).to_string()
}

/// Compute the SHA-256 hash of `data` as lower-case hex.
///
/// # Examples
///
/// ```
/// use solarnet_auth::canonical::{EMPTY_STRING_SHA256_HEX, sha256_hex};
///
/// assert_eq!(sha256_hex(b""), EMPTY_STRING_SHA256_HEX);
/// ```
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn test_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 3, 1, 12, 0, 0).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_should_sort_keys_but_keep_value_order() {
        let mut params = MultiValueMap::case_insensitive();
        params.add("b", "2").add("a", "1").add("a", "3");
        assert_eq!(build_canonical_query_string(&params), "a=1&a=3&b=2");
    }

    #[test]
    fn test_should_return_empty_for_no_query_params() {
        assert_eq!(build_canonical_query_string(&MultiValueMap::case_insensitive()), "");
    }

    #[test]
    fn test_should_escape_sub_delims_in_query() {
        let mut params = MultiValueMap::case_insensitive();
        params.add("q", "a'b(c)d*e!");
        assert_eq!(
            build_canonical_query_string(&params),
            "q=a%27b%28c%29d%2Ae%21"
        );
    }

    #[test]
    fn test_should_encode_reserved_and_unicode_characters() {
        assert_eq!(percent_encode_component("a b&c=d/e"), "a%20b%26c%3Dd%2Fe");
        assert_eq!(percent_encode_component("-_.~"), "-_.~");
        assert_eq!(percent_encode_component("°C"), "%C2%B0C");
    }

    #[test]
    fn test_should_sort_query_keys_by_raw_string() {
        let mut params = MultiValueMap::case_sensitive();
        params.add("sourceId", "a").add("nodeId", "1").add("Z", "z");
        assert_eq!(
            build_canonical_query_string(&params),
            "Z=z&nodeId=1&sourceId=a"
        );
    }

    #[test]
    fn test_should_include_only_mandatory_header_names() {
        let headers = MultiValueMap::case_insensitive();
        assert_eq!(
            canonical_header_names(&headers, false, None),
            names(&["date", "host"])
        );
        assert_eq!(
            canonical_header_names(&headers, true, None),
            names(&["host", "x-sn-date"])
        );
    }

    #[test]
    fn test_should_include_present_content_headers() {
        let mut headers = MultiValueMap::case_insensitive();
        headers
            .add("Content-Type", "application/json")
            .add("Digest", "sha-256=abc")
            .add("Accept", "application/json");
        assert_eq!(
            canonical_header_names(&headers, false, None),
            names(&["content-type", "date", "digest", "host"])
        );
    }

    #[test]
    fn test_should_merge_and_dedupe_extra_header_names() {
        let headers = MultiValueMap::case_insensitive();
        let extra = names(&["X-SN-Date", "Accept", "host"]);
        assert_eq!(
            canonical_header_names(&headers, true, Some(&extra)),
            names(&["accept", "host", "x-sn-date"])
        );
    }

    #[test]
    fn test_should_trim_but_not_collapse_header_values() {
        let mut headers = MultiValueMap::case_insensitive();
        headers
            .add("Host", "  data.solarnetwork.net  ")
            .add("X-Custom", " a   b ");
        let result = build_canonical_headers(
            &names(&["date", "host", "x-custom"]),
            &headers,
            &test_date(),
        );
        assert_eq!(
            result,
            "date:Wed, 01 Mar 2017 12:00:00 GMT\nhost:data.solarnetwork.net\nx-custom:a   b\n"
        );
    }

    #[test]
    fn test_should_override_date_header_values() {
        let mut headers = MultiValueMap::case_insensitive();
        headers
            .add("Date", "Thu, 01 Jan 1970 00:00:00 GMT")
            .add("X-SN-Date", "garbage");
        let result = build_canonical_headers(
            &names(&["date", "x-sn-date"]),
            &headers,
            &test_date(),
        );
        assert_eq!(
            result,
            "date:Wed, 01 Mar 2017 12:00:00 GMT\nx-sn-date:Wed, 01 Mar 2017 12:00:00 GMT\n"
        );
    }

    #[test]
    fn test_should_render_missing_header_as_empty_value() {
        let result = build_canonical_headers(
            &names(&["accept"]),
            &MultiValueMap::case_insensitive(),
            &test_date(),
        );
        assert_eq!(result, "accept:\n");
    }

    #[test]
    fn test_should_use_empty_string_digest_constant() {
        assert_eq!(content_digest_hex(None), sha256_hex(b""));
        let digest = Sha256::digest(b"");
        assert_eq!(content_digest_hex(Some(&digest[..])), EMPTY_STRING_SHA256_HEX);
    }

    #[test]
    fn test_should_build_canonical_request() {
        let canonical = build_canonical_request(
            "GET",
            "/solarquery/api/v1/pub/datum/list",
            "nodeId=1",
            "date:Wed, 01 Mar 2017 12:00:00 GMT\nhost:data.solarnetwork.net\n",
            "date;host",
            EMPTY_STRING_SHA256_HEX,
        );
        let expected = "GET\n\
                        /solarquery/api/v1/pub/datum/list\n\
                        nodeId=1\n\
                        date:Wed, 01 Mar 2017 12:00:00 GMT\n\
                        host:data.solarnetwork.net\n\
                        date;host\n\
                        e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert_eq!(canonical, expected);
    }

    #[test]
    fn test_should_build_string_to_sign() {
        let sts = build_string_to_sign(&test_date(), "");
        assert_eq!(
            sts,
            format!("SNWS2-HMAC-SHA256\n20170301T120000Z\n{EMPTY_STRING_SHA256_HEX}")
        );
    }
}
