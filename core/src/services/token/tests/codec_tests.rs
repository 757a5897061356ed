//! Unit tests for the token codec

use chrono::{Duration, Utc};
use jsonwebtoken::Algorithm;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, TokenType};
use crate::domain::entities::user::TokenSubject;
use crate::errors::TokenError;
use crate::services::test_support::{codec, TEST_SECRET};
use crate::services::token::{hash_token, TokenCodec, TokenConfig};

fn subject() -> TokenSubject {
    TokenSubject::new(Uuid::new_v4(), "user@example.com").with_roles(["user"])
}

#[test]
fn test_sign_and_parse_access_token() {
    let codec = codec();
    let subject = subject();
    let issued = codec
        .issue(&subject, TokenType::Access, None, Utc::now(), Duration::minutes(15))
        .unwrap();

    let claims = codec.parse(&issued.token).unwrap();
    assert_eq!(claims, issued.claims);
    assert_eq!(claims.user_id().unwrap(), subject.user_id);
    assert_eq!(claims.email, "user@example.com");
    assert_eq!(claims.token_type, TokenType::Access);
    assert_eq!(claims.iss, "sessionguard");
    assert_eq!(claims.aud, "sessionguard-api");
}

#[test]
fn test_parse_does_not_check_expiry() {
    let codec = codec();
    let issued_at = Utc::now() - Duration::days(2);
    let issued = codec
        .issue(&subject(), TokenType::Access, None, issued_at, Duration::minutes(15))
        .unwrap();

    let claims = codec.parse(&issued.token).unwrap();
    assert!(claims.is_expired_at(Utc::now()));
}

#[test]
fn test_wrong_secret_is_invalid_signature() {
    let issued = codec()
        .issue(&subject(), TokenType::Access, None, Utc::now(), Duration::minutes(15))
        .unwrap();
    let other = TokenCodec::new(TokenConfig::with_secret("another-secret")).unwrap();

    assert_eq!(other.parse(&issued.token), Err(TokenError::InvalidSignature));
}

#[test]
fn test_unexpected_algorithm_rejected() {
    let hs512 = TokenCodec::new(TokenConfig {
        algorithm: Algorithm::HS512,
        ..TokenConfig::with_secret(TEST_SECRET)
    })
    .unwrap();
    let issued = hs512
        .issue(&subject(), TokenType::Access, None, Utc::now(), Duration::minutes(15))
        .unwrap();

    assert_eq!(codec().parse(&issued.token), Err(TokenError::InvalidSignature));
}

#[test]
fn test_foreign_issuer_and_audience_rejected() {
    let foreign = TokenCodec::new(TokenConfig {
        issuer: "someone-else".to_string(),
        ..TokenConfig::with_secret(TEST_SECRET)
    })
    .unwrap();
    let issued = foreign
        .issue(&subject(), TokenType::Access, None, Utc::now(), Duration::minutes(15))
        .unwrap();
    assert!(codec().parse(&issued.token).is_err());

    let foreign = TokenCodec::new(TokenConfig {
        audience: "other-api".to_string(),
        ..TokenConfig::with_secret(TEST_SECRET)
    })
    .unwrap();
    let issued = foreign
        .issue(&subject(), TokenType::Access, None, Utc::now(), Duration::minutes(15))
        .unwrap();
    assert!(codec().parse(&issued.token).is_err());
}

#[test]
fn test_garbage_is_malformed() {
    assert_eq!(codec().parse("not-a-jwt"), Err(TokenError::Malformed));
    assert_eq!(codec().parse(""), Err(TokenError::Malformed));
}

#[test]
fn test_refresh_without_jti_fails_to_sign() {
    let result = codec().issue(&subject(), TokenType::Refresh, None, Utc::now(), Duration::days(7));
    assert!(matches!(result, Err(TokenError::Encoding { .. })));
}

#[test]
fn test_missing_claims_fail_to_sign() {
    let codec = codec();
    let mut claims = Claims::for_subject(
        &subject(),
        TokenType::Access,
        None,
        Utc::now(),
        Duration::minutes(15),
        "sessionguard",
        "sessionguard-api",
    )
    .unwrap();
    claims.email.clear();
    assert!(matches!(codec.sign(&claims), Err(TokenError::Encoding { .. })));

    claims.email = "   ".to_string();
    assert!(matches!(codec.sign(&claims), Err(TokenError::Encoding { .. })));

    let zero_ttl = Claims::for_subject(
        &subject(),
        TokenType::Access,
        None,
        Utc::now(),
        Duration::zero(),
        "sessionguard",
        "sessionguard-api",
    )
    .unwrap();
    assert!(matches!(codec.sign(&zero_ttl), Err(TokenError::Encoding { .. })));
}

#[test]
fn test_unusual_but_present_email_signs() {
    let codec = codec();
    for email in ["user@localhost", "josé@bücher.de", "admin@intranet"] {
        let subject = TokenSubject::new(Uuid::new_v4(), email);
        let issued = codec
            .issue(&subject, TokenType::Access, None, Utc::now(), Duration::minutes(15))
            .unwrap();
        assert_eq!(codec.parse(&issued.token).unwrap().email, email);
    }
}

#[test]
fn test_issue_with_unrepresentable_lifetime_fails() {
    let result = codec().issue(
        &subject(),
        TokenType::PasswordReset,
        None,
        Utc::now(),
        Duration::days(365 * 300_000),
    );
    assert!(matches!(result, Err(TokenError::Encoding { .. })));
}

#[test]
fn test_token_identifier() {
    let codec = codec();
    let now = Utc::now();

    let refresh = codec
        .issue(&subject(), TokenType::Refresh, Some("jti-1".to_string()), now, Duration::days(7))
        .unwrap();
    assert_eq!(TokenCodec::token_identifier(&refresh.token, &refresh.claims), "jti-1");

    let access = codec
        .issue(&subject(), TokenType::Access, None, now, Duration::minutes(15))
        .unwrap();
    assert_eq!(
        TokenCodec::token_identifier(&access.token, &access.claims),
        hash_token(&access.token)
    );
}

#[test]
fn test_hash_token_is_hex_sha256() {
    let hash = hash_token("abc");
    assert_eq!(hash.len(), 64);
    assert_eq!(
        hash,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}
