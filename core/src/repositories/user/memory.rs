//! In-memory user directory

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::user::TokenSubject;
use crate::errors::DomainError;

use super::r#trait::UserDirectory;

#[derive(Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<Uuid, TokenSubject>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user
    pub async fn upsert(&self, subject: TokenSubject) {
        self.users.write().await.insert(subject.user_id, subject);
    }

    pub async fn remove(&self, user_id: Uuid) -> Option<TokenSubject> {
        self.users.write().await.remove(&user_id)
    }

    pub async fn set_enabled(&self, user_id: Uuid, enabled: bool) {
        if let Some(subject) = self.users.write().await.get_mut(&user_id) {
            subject.is_enabled = enabled;
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_subject(&self, user_id: Uuid) -> Result<Option<TokenSubject>, DomainError> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}
