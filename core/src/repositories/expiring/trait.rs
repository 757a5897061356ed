//! Key/value store whose entries carry their own expiry.
//!
//! Backs the access-token blacklist and the single-use token markers. An
//! in-process map serves tests and single-instance deployments; a Redis
//! implementation lives in the infrastructure crate so every instance sees
//! the same entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::DomainError;

#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Value stored under `key`, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Store `value` until `expires_at`, replacing any previous value
    async fn set(
        &self,
        key: &str,
        value: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Atomically fetch and delete `key`
    ///
    /// Of several concurrent callers at most one receives `Some`.
    async fn take(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Remove `key`, returning whether it was present
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Drop every expired entry, returning how many were removed
    async fn sweep(&self) -> Result<u64, DomainError>;
}
