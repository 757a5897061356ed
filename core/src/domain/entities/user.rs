//! Identity a token is issued for.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The parts of a user account that end up in token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSubject {
    /// User ID
    pub user_id: Uuid,

    /// Current email address
    pub email: String,

    /// Role names granted to the user
    #[serde(default)]
    pub roles: Vec<String>,

    /// Disabled or deleted accounts cannot rotate their sessions
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

impl TokenSubject {
    pub fn new(user_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            roles: Vec::new(),
            is_enabled: true,
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }
}

fn default_enabled() -> bool {
    true
}
