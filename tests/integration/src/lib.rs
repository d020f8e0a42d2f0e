//! End-to-end signing scenarios for the SolarNetwork client crates.
//!
//! These tests drive [`solarnet_auth::AuthorizationBuilder`] through complete
//! configure-then-sign sequences and compare the results against golden
//! values computed independently from the SNWS2 algorithm.
//!
//! Run them with:
//! ```text
//! cargo test -p solarnet-integration
//! ```

use std::sync::Once;

use chrono::{DateTime, TimeZone, Utc};
use solarnet_auth::AuthorizationBuilder;

static INIT: Once = Once::new();

/// Token identifier used by every scenario.
pub const TEST_TOKEN: &str = "my-token";

/// Token secret used by every scenario.
pub const TEST_SECRET: &str = "my-token-secret";

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// The fixed request date of the golden scenarios, `2017-03-01T12:00:00Z`.
#[must_use]
pub fn test_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 3, 1, 12, 0, 0).unwrap()
}

/// A builder for [`TEST_TOKEN`] against the default environment, dated [`test_date`].
#[must_use]
pub fn test_builder() -> AuthorizationBuilder {
    init_tracing();
    let mut builder = AuthorizationBuilder::new(TEST_TOKEN);
    builder.date(test_date());
    builder
}

mod test_golden;
mod test_key_reuse;
