//! Signing key caching and builder reuse scenarios.

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use http::HeaderMap;
    use solarnet_auth::{AuthError, AuthorizationBuilder, SigningKey, parse_authorization_header};
    use solarnet_core::{HttpMethod, SolarNetConfig};

    use crate::{TEST_SECRET, TEST_TOKEN, init_tracing, test_builder, test_date};

    #[test]
    fn test_should_reuse_saved_key_across_requests() {
        let mut builder = test_builder();
        builder.save_signing_key(TEST_SECRET);
        let now = test_date() + Duration::hours(1);

        let paths = [
            "/solarquery/api/v1/sec/datum/list",
            "/solarquery/api/v1/sec/nodes",
            "/solaruser/api/v1/sec/instr/viewActive",
        ];
        for path in paths {
            builder.reset().path(path).date(test_date());
            let saved = builder.build_with_saved_key_at(&now).unwrap();
            assert_eq!(saved, builder.build(TEST_SECRET), "path {path}");
        }
    }

    #[test]
    fn test_should_sign_later_request_with_key_from_earlier_day() {
        let mut builder = test_builder();
        builder.save_signing_key(TEST_SECRET);

        let later = test_date() + Duration::days(6);
        builder.reset().date(later);
        let header = builder.build_with_saved_key_at(&later).unwrap();

        // The key is bound to the day it was derived for, not the request date.
        assert_ne!(header, builder.build(TEST_SECRET));
        let key = SigningKey::from_hex("f9e707e540bcf5b37ba0faae988dcc908e95be9ed9fa4188357fddef8490b166")
            .unwrap();
        assert_eq!(header, builder.build_with_key(&key));
    }

    #[test]
    fn test_should_expire_saved_key_on_day_boundary() {
        let mut builder = test_builder();
        let midnight = test_date() - Duration::hours(12);
        builder.date(midnight).save_signing_key(TEST_SECRET);

        let last_valid = midnight + Duration::days(7) - Duration::milliseconds(1);
        let first_invalid = midnight + Duration::days(7);
        assert!(builder.build_with_saved_key_at(&last_valid).is_ok());
        assert!(matches!(
            builder.build_with_saved_key_at(&first_invalid),
            Err(AuthError::SigningKeyExpired(_))
        ));
    }

    #[test]
    fn test_should_share_key_between_builders() {
        init_tracing();
        let mut first = AuthorizationBuilder::new(TEST_TOKEN);
        first.save_signing_key(TEST_SECRET);
        assert!(first.signing_key_valid());

        let mut second = AuthorizationBuilder::new(TEST_TOKEN);
        let key = first.signing_key().cloned().unwrap();
        second.set_signing_key(key, Some(first.request_date()));
        assert_eq!(second.signing_key_expiration(), first.signing_key_expiration());

        first.path("/solarquery/api/v1/sec/nodes");
        second
            .path("/solarquery/api/v1/sec/nodes")
            .date(first.request_date());
        assert_eq!(
            first.build_with_saved_key().unwrap(),
            second.build_with_saved_key().unwrap()
        );
    }

    #[test]
    fn test_should_sign_for_configured_environment() {
        init_tracing();
        let config = SolarNetConfig::from_lookup(|name| match name {
            "SOLARNETWORK_HOST" => Some("localhost".to_owned()),
            "SOLARNETWORK_PORT" => Some("8080".to_owned()),
            "SOLARNETWORK_PROTOCOL" => Some("http".to_owned()),
            _ => None,
        })
        .unwrap();

        let mut builder = AuthorizationBuilder::with_environment(TEST_TOKEN, config.environment());
        builder.force_host_port(true).reset().date(Utc::now());
        assert!(
            builder
                .build_canonical_request_data()
                .contains("\nhost:localhost:8080\n")
        );
    }

    #[test]
    fn test_should_write_wire_headers_matching_signature() {
        let mut builder = test_builder();
        builder
            .method(HttpMethod::Put)
            .path("/solaruser/api/v1/sec/nodes/meta/1")
            .content_type("application/json")
            .compute_content_digest(b"{}");
        let authorization = builder.build(TEST_SECRET);

        let mut headers = HeaderMap::new();
        builder.apply_to_headers(&mut headers, &authorization).unwrap();

        let parsed = parse_authorization_header(
            headers["authorization"].to_str().unwrap(),
        )
        .unwrap();
        for name in &parsed.signed_headers {
            assert!(headers.contains_key(name.as_str()), "missing {name}");
        }
        assert_eq!(headers["date"], "Wed, 01 Mar 2017 12:00:00 GMT");
    }
}
