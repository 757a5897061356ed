//! Single-use tokens (email verification, password reset).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::token::TokenType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialTokenKind {
    EmailVerification,
    PasswordReset,
}

impl SpecialTokenKind {
    pub fn as_str(&self) -> &'static str {
        self.token_type().as_str()
    }

    /// The `type` claim tokens of this kind are signed with
    pub fn token_type(&self) -> TokenType {
        match self {
            SpecialTokenKind::EmailVerification => TokenType::EmailVerification,
            SpecialTokenKind::PasswordReset => TokenType::PasswordReset,
        }
    }
}

impl std::fmt::Display for SpecialTokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unconsumed marker stored next to every issued single-use token.
///
/// Presence of the marker is the `consumed == false` state; consuming removes
/// it atomically, so a marker can go from unconsumed to consumed only once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokenMarker {
    pub kind: SpecialTokenKind,
    pub user_id: Uuid,
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
