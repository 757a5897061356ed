//! Tests for building the codec configuration from shared config

use chrono::Duration;
use jsonwebtoken::Algorithm;
use sg_shared::config::JwtConfig;

use crate::errors::DomainError;
use crate::services::token::TokenConfig;

#[test]
fn test_from_jwt_config() {
    let jwt = JwtConfig::new("secret")
        .with_algorithm("HS384")
        .with_access_expiry_minutes(5)
        .with_refresh_expiry_days(1);

    let config = TokenConfig::try_from(&jwt).unwrap();
    assert_eq!(config.algorithm, Algorithm::HS384);
    assert_eq!(config.access_token_ttl, Duration::minutes(5));
    assert_eq!(config.refresh_token_ttl, Duration::days(1));
    assert_eq!(config.secret, "secret");
}

#[test]
fn test_unsupported_algorithm_rejected() {
    for name in ["ES256", "none", "PS256"] {
        let jwt = JwtConfig::new("secret").with_algorithm(name);
        assert!(matches!(
            TokenConfig::try_from(&jwt),
            Err(DomainError::Validation { .. })
        ));
    }
}

#[test]
fn test_non_positive_lifetime_rejected() {
    let jwt = JwtConfig::new("secret").with_access_expiry_minutes(0);
    assert!(TokenConfig::try_from(&jwt).is_err());
}

#[test]
fn test_out_of_range_lifetime_rejected() {
    let mut jwt = JwtConfig::new("secret");
    jwt.access_token_expiry = i64::MAX;
    assert!(matches!(
        TokenConfig::try_from(&jwt),
        Err(DomainError::Validation { .. })
    ));

    let mut jwt = JwtConfig::new("secret");
    jwt.refresh_token_expiry = i64::MAX / 10;
    assert!(matches!(
        TokenConfig::try_from(&jwt),
        Err(DomainError::Validation { .. })
    ));
}
