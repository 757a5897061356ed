//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::TokenSubject;
use crate::errors::TokenError;

/// Value of the `token_type` field of every pair handed to clients
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

/// Declared purpose of a token, carried in the `type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
    EmailVerification,
    PasswordReset,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
            TokenType::EmailVerification => "email_verification",
            TokenType::PasswordReset => "password_reset",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims structure for JWT payload
///
/// Access tokens carry `roles`, refresh tokens carry `jti`; single-use tokens
/// carry neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Email of the subject at issue time
    pub email: String,

    /// Roles (access tokens only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Declared token type
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Session identifier (refresh tokens only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    /// Builds the claims for `subject` valid from `issued_at` for `ttl`
    ///
    /// Fails with [`TokenError::Encoding`] when the expiry is not representable.
    pub fn for_subject(
        subject: &TokenSubject,
        token_type: TokenType,
        jti: Option<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        issuer: &str,
        audience: &str,
    ) -> Result<Self, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Encoding {
                message: "token lifetime out of range".to_string(),
            })?;
        let roles = match token_type {
            TokenType::Access => subject.roles.clone(),
            _ => Vec::new(),
        };

        Ok(Self {
            sub: subject.user_id.to_string(),
            email: subject.email.clone(),
            roles,
            token_type,
            jti,
            iat: issued_at.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            exp: expires_at.timestamp(),
        })
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Expiry as a timestamp, `None` if the claim is out of range
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// Checks if the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Seconds left before expiry, zero or negative once expired
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.exp - now.timestamp()
    }
}

/// A freshly signed token together with the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,

    /// Always `Bearer`
    pub token_type: String,

    /// Refresh session backing this pair
    pub session_id: Uuid,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        refresh_expires_in: i64,
        session_id: Uuid,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
            refresh_expires_in,
            token_type: BEARER_TOKEN_TYPE.to_string(),
            session_id,
        }
    }
}

/// Wire shape of a successful refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<TokenPair> for RotationResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
            token_type: pair.token_type,
        }
    }
}
