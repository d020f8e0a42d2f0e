//! Golden-value signing scenarios.

#[cfg(test)]
mod tests {
    use sha2::{Digest, Sha256};
    use solarnet_auth::canonical::EMPTY_STRING_SHA256_HEX;
    use solarnet_auth::{AuthError, parse_authorization_header};
    use solarnet_core::HttpMethod;

    use crate::{TEST_SECRET, TEST_TOKEN, test_builder};

    const GET_AUTHORIZATION: &str = "SNWS2 Credential=my-token,SignedHeaders=date;host,\
        Signature=51460e3edc069940cff5d8d9ad89e1165ae6f625c69e598ef07e32d91fa870ef";

    const POST_AUTHORIZATION: &str = "SNWS2 Credential=my-token,\
        SignedHeaders=content-type;digest;host;x-sn-date,\
        Signature=a15a5bf27804c235724b01b4f9f05874be6594377d240488e27e5e568f566e53";

    const POST_BODY: &[u8] = br#"{"nodeId":123,"sourceId":"test"}"#;

    const SIGNING_KEY_HEX: &str =
        "f9e707e540bcf5b37ba0faae988dcc908e95be9ed9fa4188357fddef8490b166";

    #[test]
    fn test_should_sign_get_request_with_golden_value() {
        let mut builder = test_builder();
        builder
            .method(HttpMethod::Get)
            .path("/solarquery/api/v1/pub/datum/list");

        assert_eq!(
            builder.build_string_to_sign(),
            "SNWS2-HMAC-SHA256\n\
             20170301T120000Z\n\
             4faa65104ffac5a5946f737b051a6cb196d965364673104c1476aceca30bd5b5"
        );
        assert_eq!(builder.build(TEST_SECRET), GET_AUTHORIZATION);
    }

    #[test]
    fn test_should_derive_golden_signing_key() {
        let builder = test_builder();
        assert_eq!(builder.compute_signing_key(TEST_SECRET).to_hex(), SIGNING_KEY_HEX);
    }

    #[test]
    fn test_should_sign_post_request_with_golden_value() {
        let mut builder = test_builder();
        builder
            .method(HttpMethod::Post)
            .path("/solaruser/api/v1/sec/datum/meta/123")
            .query_param("sourceId", "test")
            .query_params([("b", "a'b(c)d*e!"), ("a", "3"), ("a", "1")])
            .content_type("application/json; charset=UTF-8")
            .compute_content_digest(POST_BODY)
            .use_sn_date(true);

        assert_eq!(
            builder.digest_header_value(),
            Some("sha-256=C2ihwRrxKjJ8b9ctQM4I3Hg69KU2BZreyg0x2MQJuBE=")
        );
        assert_eq!(
            builder.build_canonical_request_data(),
            "POST\n\
             /solaruser/api/v1/sec/datum/meta/123\n\
             a=3&a=1&b=a%27b%28c%29d%2Ae%21&sourceId=test\n\
             content-type:application/json; charset=UTF-8\n\
             digest:sha-256=C2ihwRrxKjJ8b9ctQM4I3Hg69KU2BZreyg0x2MQJuBE=\n\
             host:data.solarnetwork.net\n\
             x-sn-date:Wed, 01 Mar 2017 12:00:00 GMT\n\
             content-type;digest;host;x-sn-date\n\
             0b68a1c11af12a327c6fd72d40ce08dc783af4a536059adeca0d31d8c409b811"
        );
        assert_eq!(builder.build(TEST_SECRET), POST_AUTHORIZATION);
    }

    #[test]
    fn test_should_sign_same_request_from_url() {
        let mut builder = test_builder();
        builder
            .method(HttpMethod::Post)
            .url(
                "https://data.solarnetwork.net/solaruser/api/v1/sec/datum/meta/123\
                 ?sourceId=test&b=a%27b%28c%29d%2Ae%21&a=3&a=1",
                true,
            )
            .unwrap()
            .content_type("application/json; charset=UTF-8")
            .compute_content_digest(POST_BODY)
            .use_sn_date(true);

        assert_eq!(builder.build(TEST_SECRET), POST_AUTHORIZATION);
    }

    #[test]
    fn test_should_sign_explicit_digest_like_computed_digest() {
        let mut builder = test_builder();
        builder
            .method(HttpMethod::Post)
            .path("/solaruser/api/v1/sec/datum/meta/123")
            .query_param("sourceId", "test")
            .query_params([("b", "a'b(c)d*e!"), ("a", "3"), ("a", "1")])
            .content_type("application/json; charset=UTF-8")
            .put_header("Digest", "sha-256=C2ihwRrxKjJ8b9ctQM4I3Hg69KU2BZreyg0x2MQJuBE=")
            .content_sha256(Some(Sha256::digest(POST_BODY).to_vec()))
            .use_sn_date(true);

        assert_eq!(builder.build(TEST_SECRET), POST_AUTHORIZATION);
    }

    #[test]
    fn test_should_not_change_signature_for_date_header_value() {
        let mut builder = test_builder();
        builder
            .path("/solarquery/api/v1/pub/datum/list")
            .put_header("Date", "Fri, 13 Oct 2023 08:00:00 GMT");
        assert_eq!(builder.build(TEST_SECRET), GET_AUTHORIZATION);
    }

    #[test]
    fn test_should_round_trip_through_header_parser() {
        let parsed = parse_authorization_header(POST_AUTHORIZATION).unwrap();
        assert_eq!(parsed.token_id, TEST_TOKEN);
        assert_eq!(
            parsed.signed_headers,
            ["content-type", "digest", "host", "x-sn-date"]
        );
        assert_eq!(parsed.signature.len(), 64);
    }

    #[test]
    fn test_should_produce_empty_digest_segment_without_body() {
        let mut builder = test_builder();
        builder.path("/solarquery/api/v1/pub/datum/list");
        assert!(
            builder
                .build_canonical_request_data()
                .ends_with(&format!("\n{EMPTY_STRING_SHA256_HEX}"))
        );
    }

    #[test]
    fn test_should_refuse_saved_key_signature_on_fresh_builder() {
        let builder = test_builder();
        let err = builder.build_with_saved_key().unwrap_err();
        assert!(matches!(err, AuthError::MissingSigningKey));
    }
}
