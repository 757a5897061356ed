//! Session manager implementing refresh token rotation

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use sg_shared::config::SessionConfig;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::session::{RevocationReason, SessionMetadata, SessionState, SessionView};
use crate::domain::entities::token::{TokenPair, TokenType};
use crate::domain::entities::user::TokenSubject;
use crate::domain::entities::RefreshSession;
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::session::RefreshSessionStore;
use crate::repositories::user::UserDirectory;
use crate::services::revocation::RevocationRegistry;
use crate::services::store_call::bounded;
use crate::services::token::{hash_token, TokenCodec, TokenVerifier};

/// Configuration for the session manager
#[derive(Debug, Clone)]
pub struct SessionManagerConfig {
    /// Upper bound for a single store call
    pub store_timeout: StdDuration,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            store_timeout: StdDuration::from_millis(2000),
        }
    }
}

impl From<&SessionConfig> for SessionManagerConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            store_timeout: StdDuration::from_millis(config.store_timeout_ms),
        }
    }
}

/// How a caller names the session to revoke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRef {
    Id(Uuid),
    RefreshToken(String),
}

/// Issues token pairs and moves refresh sessions through their lifecycle
///
/// Every session leaves ACTIVE through the store's conditional revoke, so
/// concurrent rotations of one refresh token have exactly one winner even
/// across instances sharing the store.
pub struct SessionManager<S: RefreshSessionStore> {
    codec: Arc<TokenCodec>,
    verifier: Arc<TokenVerifier>,
    registry: Arc<RevocationRegistry>,
    store: Arc<S>,
    users: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
    config: SessionManagerConfig,
}

impl<S: RefreshSessionStore> SessionManager<S> {
    pub fn new(
        codec: Arc<TokenCodec>,
        verifier: Arc<TokenVerifier>,
        registry: Arc<RevocationRegistry>,
        store: Arc<S>,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
        config: SessionManagerConfig,
    ) -> Self {
        Self {
            codec,
            verifier,
            registry,
            store,
            users,
            clock,
            config,
        }
    }

    fn access_ttl(&self) -> Duration {
        self.codec.config().access_token_ttl
    }

    fn refresh_ttl(&self) -> Duration {
        self.codec.config().refresh_token_ttl
    }

    /// Sign a fresh access/refresh pair and persist its ACTIVE session
    pub async fn issue_pair(
        &self,
        subject: &TokenSubject,
        metadata: SessionMetadata,
    ) -> DomainResult<TokenPair> {
        let now = self.clock.now();
        let jti = Uuid::new_v4().to_string();

        let access = self
            .codec
            .issue(subject, TokenType::Access, None, now, self.access_ttl())?;
        let refresh = self.codec.issue(
            subject,
            TokenType::Refresh,
            Some(jti.clone()),
            now,
            self.refresh_ttl(),
        )?;

        let session = RefreshSession::new(
            subject.user_id,
            jti,
            hash_token(&refresh.token),
            metadata,
            now,
            self.refresh_ttl(),
        );

        let session_id = bounded(
            "session.create",
            self.config.store_timeout,
            self.store.create(session),
        )
        .await?;

        info!(user_id = %subject.user_id, session_id = %session_id, "Issued token pair");

        Ok(TokenPair::new(
            access.token,
            refresh.token,
            self.access_ttl().num_seconds(),
            self.refresh_ttl().num_seconds(),
            session_id,
        ))
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The old session is consumed before the new pair is signed; any failure
    /// aborts without issuing anything. Metadata fields the caller leaves
    /// empty are carried over from the consumed session.
    pub async fn rotate(
        &self,
        refresh_token: &str,
        metadata: SessionMetadata,
    ) -> DomainResult<TokenPair> {
        let claims = self.verifier.verify_refresh(refresh_token).await.map_err(|e| {
            log_rotation_failure(&e, "verification");
            e
        })?;

        let now = self.clock.now();
        let session = bounded(
            "session.find_by_token_hash",
            self.config.store_timeout,
            self.store.find_by_token_hash(&hash_token(refresh_token)),
        )
        .await?
        .ok_or_else(|| {
            warn!(sub = %claims.sub, "Refresh token has no session");
            DomainError::Token(TokenError::TokenNotFound)
        })?;

        match session.state_at(now) {
            SessionState::Active => {}
            SessionState::Rotated => {
                warn!(session_id = %session.id, user_id = %session.user_id, "Rotated refresh token replayed");
                return Err(TokenError::TokenInvalid.into());
            }
            state => {
                debug!(session_id = %session.id, state = ?state, "Refresh session not active");
                return Err(TokenError::TokenInvalid.into());
            }
        }

        if claims.jti.as_deref() != Some(session.jti.as_str()) {
            warn!(session_id = %session.id, "Refresh token jti does not match its session");
            return Err(TokenError::TokenInvalid.into());
        }

        let subject = self.load_subject(session.user_id).await?;

        if let Err(e) = bounded(
            "session.touch_last_used",
            self.config.store_timeout,
            self.store.touch_last_used(session.id, now),
        )
        .await
        {
            warn!(session_id = %session.id, error = %e, "Failed to record session use");
        }

        let consumed = bounded(
            "session.revoke",
            self.config.store_timeout,
            self.store.revoke(session.id, RevocationReason::Rotation, now),
        )
        .await?;

        if !consumed {
            warn!(session_id = %session.id, user_id = %session.user_id, "Lost rotation race, refresh token already used");
            return Err(TokenError::TokenInvalid.into());
        }

        let metadata = inherit_metadata(metadata, &session);
        let pair = self.issue_pair(&subject, metadata).await?;

        info!(
            user_id = %subject.user_id,
            old_session_id = %session.id,
            session_id = %pair.session_id,
            "Rotated refresh token"
        );
        Ok(pair)
    }

    async fn load_subject(&self, user_id: Uuid) -> DomainResult<TokenSubject> {
        let subject = bounded(
            "users.find_subject",
            self.config.store_timeout,
            self.users.find_subject(user_id),
        )
        .await?;

        match subject {
            Some(subject) if subject.is_enabled => Ok(subject),
            Some(_) => {
                warn!(user_id = %user_id, "Rotation refused for disabled user");
                Err(TokenError::TokenInvalid.into())
            }
            None => {
                warn!(user_id = %user_id, "Rotation refused for unknown user");
                Err(TokenError::TokenInvalid.into())
            }
        }
    }

    /// Revoke one session and blacklist its paired access token if given
    ///
    /// Returns whether the session was moved out of ACTIVE by this call. The
    /// blacklist insert is best-effort.
    pub async fn revoke(
        &self,
        session: SessionRef,
        access_token: Option<&str>,
        reason: RevocationReason,
    ) -> DomainResult<bool> {
        let now = self.clock.now();

        let session_id = match session {
            SessionRef::Id(id) => Some(id),
            SessionRef::RefreshToken(token) => bounded(
                "session.find_by_token_hash",
                self.config.store_timeout,
                self.store.find_by_token_hash(&hash_token(&token)),
            )
            .await?
            .map(|s| s.id),
        };

        let revoked = match session_id {
            Some(id) => {
                bounded(
                    "session.revoke",
                    self.config.store_timeout,
                    self.store.revoke(id, reason, now),
                )
                .await?
            }
            None => false,
        };

        if let Some(access_token) = access_token {
            if let Err(e) = self.registry.revoke(access_token, reason.as_str()).await {
                warn!(error = %e, "Failed to blacklist access token on session revoke");
            }
        }

        match session_id {
            Some(id) => info!(session_id = %id, reason = %reason, revoked, "Session revoke"),
            None => debug!(reason = %reason, "Session revoke for unknown session"),
        }

        Ok(revoked)
    }

    /// Revoke every active session of a user
    pub async fn revoke_all(&self, user_id: Uuid, reason: RevocationReason) -> DomainResult<u64> {
        let count = bounded(
            "session.revoke_all_for_user",
            self.config.store_timeout,
            self.store.revoke_all_for_user(user_id, reason, self.clock.now()),
        )
        .await?;

        info!(user_id = %user_id, reason = %reason, count, "Revoked all sessions");
        Ok(count)
    }

    /// Revoke the active sessions a user holds on one device
    pub async fn revoke_device(
        &self,
        user_id: Uuid,
        device_id: &str,
        reason: RevocationReason,
    ) -> DomainResult<u64> {
        let now = self.clock.now();
        let sessions = bounded(
            "session.find_active_by_device",
            self.config.store_timeout,
            self.store.find_active_by_device(user_id, device_id, now),
        )
        .await?;

        let mut count = 0;
        for session in sessions {
            let revoked = bounded(
                "session.revoke",
                self.config.store_timeout,
                self.store.revoke(session.id, reason, now),
            )
            .await?;
            if revoked {
                count += 1;
            }
        }

        info!(user_id = %user_id, device_id = %device_id, count, "Revoked device sessions");
        Ok(count)
    }

    /// Active sessions of a user, newest first, without token material
    pub async fn list_active_sessions(&self, user_id: Uuid) -> DomainResult<Vec<SessionView>> {
        let mut sessions = bounded(
            "session.find_active_by_user",
            self.config.store_timeout,
            self.store.find_active_by_user(user_id, self.clock.now()),
        )
        .await?;

        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions.iter().map(RefreshSession::to_view).collect())
    }
}

fn inherit_metadata(mut metadata: SessionMetadata, previous: &RefreshSession) -> SessionMetadata {
    if metadata.device_info.is_empty() {
        metadata.device_info = previous.device_info.clone();
    }
    if metadata.ip_address.is_none() {
        metadata.ip_address = previous.ip_address.clone();
    }
    if metadata.user_agent.is_none() {
        metadata.user_agent = previous.user_agent.clone();
    }
    metadata
}

fn log_rotation_failure(error: &DomainError, stage: &str) {
    match error.token_error() {
        Some(kind) => warn!(stage = stage, kind = kind.kind(), "Refresh rejected"),
        None => warn!(stage = stage, error = %error, "Refresh failed"),
    }
}
