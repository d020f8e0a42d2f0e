//! Date renderings used by SNWS2 signing.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::AuthError;

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Render an HTTP-date (RFC 1123), e.g. `Wed, 01 Mar 2017 12:00:00 GMT`.
///
/// This is the value of the `Date` or `X-SN-Date` header.
#[must_use]
pub fn http_date(date: &DateTime<Utc>) -> String {
    date.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP-date as produced by [`http_date`].
pub fn parse_http_date(value: &str) -> Result<DateTime<Utc>, AuthError> {
    NaiveDateTime::parse_from_str(value.trim(), HTTP_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| AuthError::InvalidDate(format!("{value}: {e}")))
}

/// Render the UTC calendar date in ISO 8601 basic form, e.g. `20170301`.
#[must_use]
pub fn iso8601_basic_date(date: &DateTime<Utc>) -> String {
    date.format("%Y%m%d").to_string()
}

/// Render the UTC date and time in ISO 8601 basic form, e.g. `20170301T120000Z`.
#[must_use]
pub fn iso8601_basic_datetime(date: &DateTime<Utc>) -> String {
    date.format("%Y%m%dT%H%M%SZ").to_string()
}
