//! Blacklist entry for a token revoked before its natural expiry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationEntry {
    /// `jti` claim or SHA-256 of the token
    pub identifier: String,

    /// Token expiry plus the safety buffer
    pub expires_at: DateTime<Utc>,

    pub reason: String,

    pub revoked_at: DateTime<Utc>,
}

impl RevocationEntry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
