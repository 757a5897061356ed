//! Single-use token service
//!
//! A special token is valid only while its marker sits in the expiring store.
//! Consuming takes the marker out in one atomic step, which is what makes a
//! token usable once even when two requests present it at the same moment.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use sg_shared::config::{SessionConfig, SpecialTokenConfig};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::domain::entities::special_token::{SpecialTokenKind, SpecialTokenMarker};
use crate::domain::entities::token::{Claims, TokenType};
use crate::domain::entities::user::TokenSubject;
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::expiring::ExpiringStore;
use crate::services::store_call::bounded;
use crate::services::token::{hash_token, TokenCodec, TokenVerifier};

/// Configuration for the special token service
#[derive(Debug, Clone)]
pub struct SpecialTokenServiceConfig {
    /// Default lifetime of email verification tokens
    pub email_verification_ttl: Duration,
    /// Default lifetime of password reset tokens
    pub password_reset_ttl: Duration,
    /// Key prefix inside the expiring store
    pub key_prefix: String,
    /// Upper bound for a single store call
    pub store_timeout: StdDuration,
}

impl Default for SpecialTokenServiceConfig {
    fn default() -> Self {
        Self {
            email_verification_ttl: Duration::hours(24),
            password_reset_ttl: Duration::hours(1),
            key_prefix: "single_use".to_string(),
            store_timeout: StdDuration::from_millis(2000),
        }
    }
}

impl SpecialTokenServiceConfig {
    /// Lifetimes outside the representable range fall back to the defaults
    pub fn from_config(tokens: &SpecialTokenConfig, session: &SessionConfig) -> Self {
        let defaults = Self::default();
        Self {
            email_verification_ttl: Duration::try_seconds(tokens.email_verification_ttl)
                .unwrap_or(defaults.email_verification_ttl),
            password_reset_ttl: Duration::try_seconds(tokens.password_reset_ttl)
                .unwrap_or(defaults.password_reset_ttl),
            key_prefix: tokens.key_prefix.clone(),
            store_timeout: StdDuration::from_millis(session.store_timeout_ms),
        }
    }

    pub fn default_ttl(&self, kind: SpecialTokenKind) -> Duration {
        match kind {
            SpecialTokenKind::EmailVerification => self.email_verification_ttl,
            SpecialTokenKind::PasswordReset => self.password_reset_ttl,
        }
    }
}

pub struct SpecialTokenService {
    codec: Arc<TokenCodec>,
    verifier: Arc<TokenVerifier>,
    store: Arc<dyn ExpiringStore>,
    clock: Arc<dyn Clock>,
    config: SpecialTokenServiceConfig,
}

impl SpecialTokenService {
    pub fn new(
        codec: Arc<TokenCodec>,
        verifier: Arc<TokenVerifier>,
        store: Arc<dyn ExpiringStore>,
        clock: Arc<dyn Clock>,
        config: SpecialTokenServiceConfig,
    ) -> Self {
        Self {
            codec,
            verifier,
            store,
            clock,
            config,
        }
    }

    fn marker_key(&self, kind: SpecialTokenKind, token: &str) -> String {
        format!("{}:{}:{}", self.config.key_prefix, kind, hash_token(token))
    }

    /// Sign a single-use token and store its unconsumed marker
    ///
    /// `ttl` falls back to the per-kind default when `None`.
    pub async fn issue(
        &self,
        subject: &TokenSubject,
        kind: SpecialTokenKind,
        ttl: Option<Duration>,
    ) -> DomainResult<String> {
        let ttl = ttl.unwrap_or_else(|| self.config.default_ttl(kind));
        if ttl <= Duration::zero() {
            return Err(DomainError::Validation {
                message: "Token lifetime must be positive".to_string(),
            });
        }

        let now = self.clock.now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| DomainError::Validation {
            message: "Token lifetime is out of range".to_string(),
        })?;
        let issued = self
            .codec
            .issue(subject, kind.token_type(), None, now, ttl)?;

        let marker = SpecialTokenMarker {
            kind,
            user_id: subject.user_id,
            email: subject.email.clone(),
            issued_at: now,
            expires_at,
        };
        let value = serde_json::to_string(&marker)
            .map_err(|e| DomainError::Internal { message: e.to_string() })?;

        bounded(
            "special_token.set",
            self.config.store_timeout,
            self.store
                .set(&self.marker_key(kind, &issued.token), value, marker.expires_at),
        )
        .await?;

        info!(user_id = %subject.user_id, kind = %kind, expires_at = %marker.expires_at, "Issued single-use token");
        Ok(issued.token)
    }

    /// Verify a single-use token and consume its marker
    ///
    /// The caller applies the side effect (mark email verified, allow the
    /// password change) only after this returns `Ok`.
    pub async fn consume(&self, token: &str, expected: SpecialTokenKind) -> DomainResult<Claims> {
        let claims = self.verifier.verify(token, expected.token_type()).await?;

        let value = bounded(
            "special_token.take",
            self.config.store_timeout,
            self.store.take(&self.marker_key(expected, token)),
        )
        .await?
        .ok_or_else(|| {
            warn!(sub = %claims.sub, kind = %expected, "Single-use token already consumed or unknown");
            DomainError::Token(TokenError::TokenNotFound)
        })?;

        let marker: SpecialTokenMarker = serde_json::from_str(&value).map_err(|e| {
            warn!(error = %e, "Unreadable single-use token marker");
            DomainError::Token(TokenError::TokenInvalid)
        })?;

        if marker.kind != expected || marker.user_id.to_string() != claims.sub {
            warn!(sub = %claims.sub, marker_user = %marker.user_id, "Single-use token marker does not match token");
            return Err(TokenError::TokenInvalid.into());
        }

        info!(user_id = %marker.user_id, kind = %expected, "Consumed single-use token");
        Ok(claims)
    }

    /// Drop the marker of an unconsumed token so it can no longer be used
    pub async fn revoke_token(&self, token: &str) -> DomainResult<bool> {
        let claims = match self.codec.parse(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(kind = e.kind(), "Ignoring revoke of unparseable single-use token");
                return Ok(false);
            }
        };

        let kind = match claims.token_type {
            TokenType::EmailVerification => SpecialTokenKind::EmailVerification,
            TokenType::PasswordReset => SpecialTokenKind::PasswordReset,
            other => {
                debug!(token_type = %other, "Not a single-use token");
                return Ok(false);
            }
        };

        let removed = bounded(
            "special_token.delete",
            self.config.store_timeout,
            self.store.delete(&self.marker_key(kind, token)),
        )
        .await?;

        if removed {
            info!(sub = %claims.sub, kind = %kind, "Revoked single-use token");
        }
        Ok(removed)
    }

    /// Remove expired markers from the backing store
    pub async fn sweep(&self) -> DomainResult<u64> {
        bounded("special_token.sweep", self.config.store_timeout, self.store.sweep()).await
    }
}
