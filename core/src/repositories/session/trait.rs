//! Refresh session store trait defining the interface for session persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::session::{RefreshSession, RevocationReason};
use crate::errors::DomainError;
use crate::services::token::hash_token;

/// Persistence contract for refresh sessions
///
/// Rows are keyed by id, by the SHA-256 of the refresh token and by user.
/// Raw refresh tokens never reach the store.
///
/// # Concurrency
/// `revoke` must be a conditional update ("revoke if still active"), not a
/// read followed by a write: two callers racing on the same row must see
/// exactly one `Ok(true)`. This is what makes a refresh token single-use
/// across instances.
#[async_trait]
pub trait RefreshSessionStore: Send + Sync {
    /// Persist a new session
    ///
    /// # Returns
    /// * `Ok(Uuid)` - Id of the stored row
    /// * `Err(DomainError)` - Save failed (e.g., duplicate token hash)
    async fn create(&self, session: RefreshSession) -> Result<Uuid, DomainError>;

    /// Find a session by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshSession>, DomainError>;

    /// Find a session by the hash of its refresh token
    ///
    /// Returns the row whatever its state; callers decide what a revoked or
    /// expired row means.
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, DomainError>;

    /// All sessions of a user that are active and not expired at `now`
    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshSession>, DomainError>;

    /// Active sessions of a user whose device info carries `device_id`
    async fn find_active_by_device(
        &self,
        user_id: Uuid,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshSession>, DomainError>;

    /// Revoke a session if it is still active
    ///
    /// # Returns
    /// * `Ok(true)` - This call moved the session out of ACTIVE
    /// * `Ok(false)` - Session missing or already revoked
    /// * `Err(DomainError)` - Update failed
    async fn revoke(
        &self,
        id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Revoke every active session of a user, returning how many changed
    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// Record that a session was just used
    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DomainError>;

    /// Delete rows that expired or were revoked before `cutoff`
    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;

    /// Find a session by its raw refresh token
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshSession>, DomainError> {
        self.find_by_token_hash(&hash_token(token)).await
    }

    /// Count active sessions for a user
    async fn count_active_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        Ok(self.find_active_by_user(user_id, now).await?.len())
    }
}
