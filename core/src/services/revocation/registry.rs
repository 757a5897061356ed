//! Revocation registry backed by an [`ExpiringStore`]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use sg_shared::config::{RevocationConfig, SessionConfig};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::domain::entities::revocation::RevocationEntry;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::expiring::ExpiringStore;
use crate::services::store_call::bounded;
use crate::services::token::TokenCodec;

/// Configuration for the revocation registry
#[derive(Debug, Clone)]
pub struct RevocationRegistryConfig {
    /// How long an entry outlives the token it blocks
    pub buffer: Duration,
    /// Key prefix inside the expiring store
    pub key_prefix: String,
    /// Upper bound for a single store call
    pub store_timeout: StdDuration,
}

impl Default for RevocationRegistryConfig {
    fn default() -> Self {
        Self {
            buffer: Duration::seconds(60),
            key_prefix: "revoked".to_string(),
            store_timeout: StdDuration::from_millis(2000),
        }
    }
}

impl RevocationRegistryConfig {
    pub fn from_config(revocation: &RevocationConfig, session: &SessionConfig) -> Self {
        Self {
            buffer: Duration::try_seconds(revocation.buffer_seconds.max(0))
                .unwrap_or_else(|| Self::default().buffer),
            key_prefix: revocation.key_prefix.clone(),
            store_timeout: StdDuration::from_millis(session.store_timeout_ms),
        }
    }
}

/// Records revoked token identifiers until shortly after the tokens expire
///
/// Entries expire at `token exp + buffer`, so the blacklist never holds
/// anything a plain expiry check would not already reject for longer than
/// the buffer.
pub struct RevocationRegistry {
    codec: Arc<TokenCodec>,
    store: Arc<dyn ExpiringStore>,
    clock: Arc<dyn Clock>,
    config: RevocationRegistryConfig,
}

impl RevocationRegistry {
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn ExpiringStore>,
        clock: Arc<dyn Clock>,
        config: RevocationRegistryConfig,
    ) -> Self {
        Self {
            codec,
            store,
            clock,
            config,
        }
    }

    fn key(&self, identifier: &str) -> String {
        format!("{}:{}", self.config.key_prefix, identifier)
    }

    /// Blacklist a token until it expires
    ///
    /// Unparseable and already expired tokens are ignored.
    ///
    /// # Returns
    /// * `Ok(true)` - An entry was stored
    /// * `Ok(false)` - Nothing to blacklist
    pub async fn revoke(&self, token: &str, reason: &str) -> DomainResult<bool> {
        let claims = match self.codec.parse(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(kind = e.kind(), "Ignoring revoke of unparseable token");
                return Ok(false);
            }
        };

        let Some(expires_at) = claims.expires_at() else {
            return Ok(false);
        };

        let identifier = TokenCodec::token_identifier(token, &claims);
        self.revoke_identifier(&identifier, expires_at, reason).await
    }

    /// Blacklist an identifier whose token expires at `token_expires_at`
    pub async fn revoke_identifier(
        &self,
        identifier: &str,
        token_expires_at: DateTime<Utc>,
        reason: &str,
    ) -> DomainResult<bool> {
        let now = self.clock.now();
        if token_expires_at <= now {
            debug!(identifier = %identifier, "Token already expired, nothing to revoke");
            return Ok(false);
        }

        let entry = RevocationEntry {
            identifier: identifier.to_string(),
            expires_at: token_expires_at
                .checked_add_signed(self.config.buffer)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            reason: reason.to_string(),
            revoked_at: now,
        };
        let value = serde_json::to_string(&entry)
            .map_err(|e| DomainError::Internal { message: e.to_string() })?;

        bounded(
            "revocation.set",
            self.config.store_timeout,
            self.store.set(&self.key(identifier), value, entry.expires_at),
        )
        .await?;

        info!(
            identifier = %identifier,
            reason = %reason,
            expires_at = %entry.expires_at,
            "Token revoked"
        );
        Ok(true)
    }

    /// Whether `identifier` is currently blacklisted
    ///
    /// An entry found past its expiry is evicted and reported as not revoked.
    pub async fn is_revoked(&self, identifier: &str) -> DomainResult<bool> {
        let key = self.key(identifier);
        let value = bounded(
            "revocation.get",
            self.config.store_timeout,
            self.store.get(&key),
        )
        .await?;

        let Some(value) = value else {
            return Ok(false);
        };

        match serde_json::from_str::<RevocationEntry>(&value) {
            Ok(entry) if entry.is_expired_at(self.clock.now()) => {
                let evicted = bounded(
                    "revocation.delete",
                    self.config.store_timeout,
                    self.store.delete(&key),
                )
                .await;
                if let Err(e) = evicted {
                    warn!(error = %e, "Failed to evict expired revocation entry");
                }
                Ok(false)
            }
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(error = %e, identifier = %identifier, "Unreadable revocation entry, treating as revoked");
                Ok(true)
            }
        }
    }

    /// Stored entry for `identifier`, if any
    pub async fn entry(&self, identifier: &str) -> DomainResult<Option<RevocationEntry>> {
        let value = bounded(
            "revocation.get",
            self.config.store_timeout,
            self.store.get(&self.key(identifier)),
        )
        .await?;

        value
            .map(|v| serde_json::from_str(&v).map_err(|e| DomainError::Internal { message: e.to_string() }))
            .transpose()
    }

    /// Remove every expired entry from the backing store
    pub async fn sweep(&self) -> DomainResult<u64> {
        let removed = bounded("revocation.sweep", self.config.store_timeout, self.store.sweep()).await?;
        if removed > 0 {
            debug!(removed, "Swept expired revocation entries");
        }
        Ok(removed)
    }
}
