//! Redis-backed expiring store shared by every instance
//!
//! Entry expiry is delegated to Redis key TTLs, so `sweep` has nothing to
//! do. `take` maps to `GETDEL`, which makes single-use consumption atomic
//! across instances.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use sg_core::clock::Clock;
use sg_core::errors::DomainError;
use sg_core::repositories::ExpiringStore;

use super::redis_client::RedisClient;

pub struct RedisExpiringStore {
    client: RedisClient,
    clock: Arc<dyn Clock>,
}

impl RedisExpiringStore {
    pub fn new(client: RedisClient, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }

    fn key(&self, key: &str) -> String {
        self.client.make_key(key)
    }

    /// Whole seconds until `expires_at`, never below one
    pub(crate) fn ttl_seconds(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> u64 {
        let remaining = (expires_at - now).num_milliseconds();
        // round up so an entry never disappears before its expiry
        let seconds = (remaining + 999) / 1000;
        seconds.max(1) as u64
    }
}

#[async_trait]
impl ExpiringStore for RedisExpiringStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.client.get(&self.key(key)).await?)
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let ttl = Self::ttl_seconds(self.clock.now(), expires_at);
        self.client.set_with_expiry(&self.key(key), &value, ttl).await?;
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.client.get_del(&self.key(key)).await?)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.client.delete(&self.key(key)).await?)
    }

    async fn sweep(&self) -> Result<u64, DomainError> {
        debug!("Redis expires keys natively, nothing to sweep");
        Ok(0)
    }
}
