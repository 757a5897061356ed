//! Unit tests for single-use tokens

use std::sync::Arc;

use chrono::Duration;
use sg_shared::config::{SessionConfig, SpecialTokenConfig};

use crate::domain::entities::special_token::SpecialTokenKind;
use crate::errors::{DomainError, TokenError};
use crate::services::special_token::SpecialTokenServiceConfig;
use crate::services::test_support::Harness;

fn token_error<T: std::fmt::Debug>(result: Result<T, DomainError>) -> TokenError {
    match result {
        Err(DomainError::Token(e)) => e,
        other => panic!("expected token error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_consume_exactly_once() {
    let h = Harness::new();
    let subject = h.user().await;
    let token = h
        .special_tokens
        .issue(&subject, SpecialTokenKind::EmailVerification, Some(Duration::hours(24)))
        .await
        .unwrap();

    let claims = h
        .special_tokens
        .consume(&token, SpecialTokenKind::EmailVerification)
        .await
        .unwrap();
    assert_eq!(claims.user_id().unwrap(), subject.user_id);
    assert_eq!(claims.email, subject.email);
    assert!(claims.roles.is_empty());

    assert_eq!(
        token_error(
            h.special_tokens
                .consume(&token, SpecialTokenKind::EmailVerification)
                .await
        ),
        TokenError::TokenNotFound
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consume_has_one_winner() {
    let h = Harness::new();
    let subject = h.user().await;
    let token = h
        .special_tokens
        .issue(&subject, SpecialTokenKind::PasswordReset, None)
        .await
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&h.special_tokens);
            let token = token.clone();
            tokio::spawn(async move {
                service.consume(&token, SpecialTokenKind::PasswordReset).await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert_eq!(e.token_error(), Some(&TokenError::TokenNotFound)),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_wrong_kind_is_type_mismatch_and_keeps_marker() {
    let h = Harness::new();
    let subject = h.user().await;
    let token = h
        .special_tokens
        .issue(&subject, SpecialTokenKind::EmailVerification, None)
        .await
        .unwrap();

    assert!(matches!(
        token_error(h.special_tokens.consume(&token, SpecialTokenKind::PasswordReset).await),
        TokenError::TokenTypeMismatch { .. }
    ));

    h.special_tokens
        .consume(&token, SpecialTokenKind::EmailVerification)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_default_ttl_per_kind() {
    let h = Harness::new();
    let subject = h.user().await;
    let token = h
        .special_tokens
        .issue(&subject, SpecialTokenKind::PasswordReset, None)
        .await
        .unwrap();

    h.clock.advance(Duration::minutes(61));
    assert_eq!(
        token_error(h.special_tokens.consume(&token, SpecialTokenKind::PasswordReset).await),
        TokenError::TokenExpired
    );
}

#[tokio::test]
async fn test_revoke_token_drops_marker() {
    let h = Harness::new();
    let subject = h.user().await;
    let token = h
        .special_tokens
        .issue(&subject, SpecialTokenKind::PasswordReset, None)
        .await
        .unwrap();

    assert!(h.special_tokens.revoke_token(&token).await.unwrap());
    assert!(!h.special_tokens.revoke_token(&token).await.unwrap());
    assert!(!h.special_tokens.revoke_token("garbage").await.unwrap());

    assert_eq!(
        token_error(h.special_tokens.consume(&token, SpecialTokenKind::PasswordReset).await),
        TokenError::TokenNotFound
    );
}

#[tokio::test]
async fn test_non_positive_ttl_rejected() {
    let h = Harness::new();
    let subject = h.user().await;
    let result = h
        .special_tokens
        .issue(&subject, SpecialTokenKind::EmailVerification, Some(Duration::zero()))
        .await;
    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[tokio::test]
async fn test_unrepresentable_ttl_rejected() {
    let h = Harness::new();
    let subject = h.user().await;
    let result = h
        .special_tokens
        .issue(
            &subject,
            SpecialTokenKind::PasswordReset,
            Some(Duration::days(365 * 300_000)),
        )
        .await;

    assert!(matches!(result, Err(DomainError::Validation { .. })));
    assert!(h.store.is_empty().await);
}

#[test]
fn test_out_of_range_configured_ttl_uses_default() {
    let tokens = SpecialTokenConfig {
        email_verification_ttl: i64::MAX,
        password_reset_ttl: 600,
        ..SpecialTokenConfig::default()
    };
    let config = SpecialTokenServiceConfig::from_config(&tokens, &SessionConfig::default());

    assert_eq!(
        config.default_ttl(SpecialTokenKind::EmailVerification),
        SpecialTokenServiceConfig::default().email_verification_ttl
    );
    assert_eq!(
        config.default_ttl(SpecialTokenKind::PasswordReset),
        Duration::minutes(10)
    );
}

#[tokio::test]
async fn test_expired_markers_are_swept() {
    let h = Harness::new();
    let subject = h.user().await;
    h.special_tokens
        .issue(&subject, SpecialTokenKind::PasswordReset, Some(Duration::minutes(5)))
        .await
        .unwrap();

    assert_eq!(h.special_tokens.sweep().await.unwrap(), 0);
    h.clock.advance(Duration::minutes(6));
    assert_eq!(h.special_tokens.sweep().await.unwrap(), 1);
}
