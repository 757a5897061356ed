//! Full token verification: signature, expiry, type, blacklist.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::domain::entities::token::{Claims, TokenType};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::services::revocation::RevocationRegistry;

use super::codec::{hash_token, TokenCodec};

/// Verifies presented tokens
///
/// Checks run in a fixed order and stop at the first failure. A blacklist
/// lookup that errors or times out fails the verification.
pub struct TokenVerifier {
    codec: Arc<TokenCodec>,
    registry: Arc<RevocationRegistry>,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    pub fn new(
        codec: Arc<TokenCodec>,
        registry: Arc<RevocationRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec,
            registry,
            clock,
        }
    }

    /// Verify `token` as a token of type `expected`
    pub async fn verify(&self, token: &str, expected: TokenType) -> DomainResult<Claims> {
        let fingerprint = fingerprint(token);

        let claims = self.codec.parse(token).map_err(|e| match e {
            TokenError::InvalidSignature | TokenError::Malformed => {
                debug!(token = %fingerprint, kind = e.kind(), "Rejected token");
                DomainError::Token(TokenError::TokenInvalid)
            }
            other => DomainError::Token(other),
        })?;

        if claims.is_expired_at(self.clock.now()) {
            debug!(token = %fingerprint, token_type = %claims.token_type, "Token expired");
            return Err(TokenError::TokenExpired.into());
        }

        if claims.token_type != expected {
            warn!(
                token = %fingerprint,
                expected = %expected,
                actual = %claims.token_type,
                "Token type mismatch"
            );
            return Err(TokenError::TokenTypeMismatch {
                expected: expected.to_string(),
                actual: claims.token_type.to_string(),
            }
            .into());
        }

        let identifier = TokenCodec::token_identifier(token, &claims);
        match self.registry.is_revoked(&identifier).await {
            Ok(false) => Ok(claims),
            Ok(true) => {
                warn!(token = %fingerprint, sub = %claims.sub, "Blacklisted token presented");
                Err(TokenError::TokenBlacklisted.into())
            }
            Err(e) => {
                warn!(token = %fingerprint, error = %e, "Blacklist lookup failed, rejecting token");
                Err(e)
            }
        }
    }

    /// Verify an access token
    pub async fn verify_access(&self, token: &str) -> DomainResult<Claims> {
        self.verify(token, TokenType::Access).await
    }

    /// Verify a refresh token
    pub async fn verify_refresh(&self, token: &str) -> DomainResult<Claims> {
        self.verify(token, TokenType::Refresh).await
    }
}

/// Short hash prefix used to correlate a token across log lines
pub(crate) fn fingerprint(token: &str) -> String {
    hash_token(token)[..12].to_string()
}
