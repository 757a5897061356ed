//! Shared fixtures for service tests

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::clock::{Clock, ManualClock};
use crate::domain::entities::user::TokenSubject;
use crate::errors::DomainError;
use crate::repositories::expiring::{ExpiringStore, InMemoryExpiringStore};
use crate::repositories::session::InMemorySessionStore;
use crate::repositories::user::InMemoryUserDirectory;
use crate::services::revocation::{RevocationRegistry, RevocationRegistryConfig};
use crate::services::session::{SessionManager, SessionManagerConfig};
use crate::services::special_token::{SpecialTokenService, SpecialTokenServiceConfig};
use crate::services::token::{TokenCodec, TokenConfig, TokenVerifier};

pub(crate) const TEST_SECRET: &str = "test-secret-for-unit-tests-only";

pub(crate) fn codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(TokenConfig::with_secret(TEST_SECRET)).unwrap())
}

/// Every service wired against in-memory stores and a manual clock
pub(crate) struct Harness {
    pub clock: Arc<ManualClock>,
    pub codec: Arc<TokenCodec>,
    pub store: Arc<InMemoryExpiringStore>,
    pub registry: Arc<RevocationRegistry>,
    pub verifier: Arc<TokenVerifier>,
    pub sessions: Arc<InMemorySessionStore>,
    pub users: Arc<InMemoryUserDirectory>,
    pub manager: Arc<SessionManager<InMemorySessionStore>>,
    pub special_tokens: Arc<SpecialTokenService>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        let store = Arc::new(InMemoryExpiringStore::new(clock.clone()));
        Self::with_expiring_store(clock, store.clone(), store)
    }

    /// Build with a custom blacklist store; `store` still backs the markers
    pub fn with_expiring_store(
        clock: Arc<ManualClock>,
        store: Arc<InMemoryExpiringStore>,
        blacklist: Arc<dyn ExpiringStore>,
    ) -> Self {
        let codec = codec();
        let registry = Arc::new(RevocationRegistry::new(
            codec.clone(),
            blacklist,
            clock.clone(),
            RevocationRegistryConfig::default(),
        ));
        let verifier = Arc::new(TokenVerifier::new(
            codec.clone(),
            registry.clone(),
            clock.clone(),
        ));
        let sessions = Arc::new(InMemorySessionStore::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let manager = Arc::new(SessionManager::new(
            codec.clone(),
            verifier.clone(),
            registry.clone(),
            sessions.clone(),
            users.clone(),
            clock.clone(),
            SessionManagerConfig::default(),
        ));
        let special_tokens = Arc::new(SpecialTokenService::new(
            codec.clone(),
            verifier.clone(),
            store.clone(),
            clock.clone(),
            SpecialTokenServiceConfig::default(),
        ));

        Self {
            clock,
            codec,
            store,
            registry,
            verifier,
            sessions,
            users,
            manager,
            special_tokens,
        }
    }

    /// Register a fresh enabled user
    pub async fn user(&self) -> TokenSubject {
        let subject = TokenSubject::new(Uuid::new_v4(), "user@example.com").with_roles(["user"]);
        self.users.upsert(subject.clone()).await;
        subject
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// Expiring store whose every call fails
pub(crate) struct FailingExpiringStore;

#[async_trait]
impl ExpiringStore for FailingExpiringStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Err(DomainError::Storage { message: "connection refused".to_string() })
    }

    async fn set(&self, _key: &str, _value: String, _expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        Err(DomainError::Storage { message: "connection refused".to_string() })
    }

    async fn take(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Err(DomainError::Storage { message: "connection refused".to_string() })
    }

    async fn delete(&self, _key: &str) -> Result<bool, DomainError> {
        Err(DomainError::Storage { message: "connection refused".to_string() })
    }

    async fn sweep(&self) -> Result<u64, DomainError> {
        Err(DomainError::Storage { message: "connection refused".to_string() })
    }
}

/// Expiring store that never answers within a test's patience
pub(crate) struct HangingExpiringStore;

impl HangingExpiringStore {
    async fn hang() {
        tokio::time::sleep(StdDuration::from_secs(3600)).await;
    }
}

#[async_trait]
impl ExpiringStore for HangingExpiringStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Self::hang().await;
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        Self::hang().await;
        Ok(())
    }

    async fn take(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Self::hang().await;
        Ok(None)
    }

    async fn delete(&self, _key: &str) -> Result<bool, DomainError> {
        Self::hang().await;
        Ok(false)
    }

    async fn sweep(&self) -> Result<u64, DomainError> {
        Self::hang().await;
        Ok(0)
    }
}
