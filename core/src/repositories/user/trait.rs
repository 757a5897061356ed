//! Lookup of the account a token is issued for.
//!
//! User records are owned by the account service; the token core only needs
//! the fields that end up in claims and whether the account may still sign in.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::TokenSubject;
use crate::errors::DomainError;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Current token subject for `user_id`
    ///
    /// # Returns
    /// * `Ok(Some(TokenSubject))` - User exists (possibly disabled)
    /// * `Ok(None)` - User was deleted or never existed
    /// * `Err(DomainError)` - Lookup failed
    async fn find_subject(&self, user_id: Uuid) -> Result<Option<TokenSubject>, DomainError>;
}
