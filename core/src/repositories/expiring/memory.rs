//! In-memory expiring store with lazy eviction

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::clock::Clock;
use crate::errors::DomainError;

use super::r#trait::ExpiringStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Expiring store held in process memory
///
/// Entries past their expiry are invisible to reads and removed on the read
/// that finds them, in addition to [`ExpiringStore::sweep`].
#[derive(Clone)]
pub struct InMemoryExpiringStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryExpiringStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Number of entries currently held, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ExpiringStore for InMemoryExpiringStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired_at(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Re-check under the write lock: a concurrent `set` may have replaced it
        let mut entries = self.entries.write().await;
        if entries.get(key).map(|e| e.is_expired_at(now)).unwrap_or(false) {
            entries.remove(key);
            debug!(key = %key, "Evicted expired entry on read");
        }
        Ok(entries
            .get(key)
            .filter(|e| !e.is_expired_at(now))
            .map(|e| e.value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, DomainError> {
        let now = self.clock.now();
        let entry = self.entries.write().await.remove(key);
        Ok(entry.filter(|e| !e.is_expired_at(now)).map(|e| e.value))
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn sweep(&self) -> Result<u64, DomainError> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired_at(now));
        Ok((before - entries.len()) as u64)
    }
}
