//! In-memory refresh session store
//!
//! Single-instance deployments and tests. A single write lock around the
//! check-and-flip in `revoke` gives the same compare-and-swap guarantee as the
//! conditional UPDATE of the SQL store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::session::{RefreshSession, RevocationReason};
use crate::errors::DomainError;

use super::r#trait::RefreshSessionStore;

/// Refresh session store backed by a map keyed by session id
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, RefreshSession>>>,
}

impl InMemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows in any state
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl RefreshSessionStore for InMemorySessionStore {
    async fn create(&self, session: RefreshSession) -> Result<Uuid, DomainError> {
        let mut sessions = self.sessions.write().await;

        if sessions
            .values()
            .any(|s| s.token_hash == session.token_hash || s.id == session.id)
        {
            return Err(DomainError::Storage {
                message: "Refresh session already exists".to_string(),
            });
        }

        let id = session.id;
        sessions.insert(id, session);
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshSession>, DomainError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .find(|s| s.token_hash == token_hash)
            .cloned())
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshSession>, DomainError> {
        let sessions = self.sessions.read().await;
        let mut active: Vec<RefreshSession> = sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_valid_at(now))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    async fn find_active_by_device(
        &self,
        user_id: Uuid,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshSession>, DomainError> {
        let mut active = self.find_active_by_user(user_id, now).await?;
        active.retain(|s| s.device_id() == Some(device_id));
        Ok(active)
    }

    async fn revoke(
        &self,
        id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions
            .get_mut(&id)
            .map(|session| session.revoke(reason, at))
            .unwrap_or(false))
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let mut sessions = self.sessions.write().await;
        let mut count = 0;

        for session in sessions.values_mut().filter(|s| s.user_id == user_id) {
            if session.revoke(reason, at) {
                count += 1;
            }
        }

        Ok(count)
    }

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(session) = self.sessions.write().await.get_mut(&id) {
            session.last_used_at = Some(at);
        }
        Ok(())
    }

    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, s| {
            let expired = s.expires_at < cutoff;
            let revoked = s.revoked_at.map(|at| at < cutoff).unwrap_or(false);
            !(expired || revoked)
        });

        Ok((before - sessions.len()) as u64)
    }
}
