//! Unit tests for domain error types

use sg_shared::errors::IntoErrorResponse;

use crate::errors::{DomainError, TokenError, REFRESH_FAILURE_MESSAGE, TOKEN_FAILURE_MESSAGE};

#[test]
fn test_every_rejection_maps_to_same_refresh_message() {
    let failures = vec![
        TokenError::TokenExpired,
        TokenError::TokenInvalid,
        TokenError::TokenTypeMismatch {
            expected: "refresh".to_string(),
            actual: "access".to_string(),
        },
        TokenError::TokenBlacklisted,
        TokenError::TokenNotFound,
        TokenError::InvalidSignature,
        TokenError::Malformed,
    ];

    for failure in failures {
        let response = DomainError::Token(failure).to_refresh_response();
        assert_eq!(response.error, "INVALID_TOKEN");
        assert_eq!(response.message, REFRESH_FAILURE_MESSAGE);
    }
}

#[test]
fn test_generic_message_hides_detail() {
    let err = DomainError::Token(TokenError::TokenBlacklisted);
    let response = err.to_error_response();
    assert_eq!(response.message, TOKEN_FAILURE_MESSAGE);
    assert!(!response.message.contains("revoked"));
}

#[test]
fn test_storage_errors_are_not_auth_failures() {
    let err = DomainError::storage("Failed to revoke session", "connection reset");
    assert!(!err.is_auth_failure());
    assert!(err.is_unavailable());
    assert_eq!(err.to_refresh_response().error, "SERVICE_UNAVAILABLE");

    let timeout = DomainError::Timeout {
        operation: "session_store.revoke".to_string(),
    };
    assert!(timeout.is_unavailable());
}

#[test]
fn test_encoding_is_server_side() {
    let err = DomainError::Token(TokenError::Encoding {
        message: "missing subject".to_string(),
    });
    assert!(!err.is_auth_failure());
    assert_eq!(err.to_error_response().error, "INTERNAL_ERROR");
}

#[test]
fn test_kind_names() {
    assert_eq!(TokenError::TokenBlacklisted.kind(), "blacklisted");
    assert_eq!(TokenError::TokenNotFound.kind(), "not_found");
    assert_eq!(
        DomainError::Token(TokenError::TokenExpired).token_error(),
        Some(&TokenError::TokenExpired)
    );
}
