//! Token error kinds
//!
//! Each variant is one failure kind of the token subsystem. Callers branch on
//! the variant; the display text is for logs only and never reaches clients.

use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    /// Bad signature, bad format, wrong issuer/audience, or a refresh
    /// session that is no longer active (already used)
    #[error("Token invalid")]
    TokenInvalid,

    #[error("Token type mismatch: expected {expected}, got {actual}")]
    TokenTypeMismatch { expected: String, actual: String },

    #[error("Token revoked")]
    TokenBlacklisted,

    /// Refresh session or single-use marker absent from its store
    #[error("Token not found")]
    TokenNotFound,

    #[error("Token encoding failed: {message}")]
    Encoding { message: String },

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Malformed token")]
    Malformed,

    #[error("Failed to load signing key: {message}")]
    KeyLoad { message: String },
}

impl TokenError {
    /// Stable machine-readable name of the failure kind, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::TokenExpired => "expired",
            TokenError::TokenInvalid => "invalid",
            TokenError::TokenTypeMismatch { .. } => "type_mismatch",
            TokenError::TokenBlacklisted => "blacklisted",
            TokenError::TokenNotFound => "not_found",
            TokenError::Encoding { .. } => "encoding",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Malformed => "malformed",
            TokenError::KeyLoad { .. } => "key_load",
        }
    }

    /// True for failures caused by the presented token rather than by the server
    pub fn is_rejection(&self) -> bool {
        !matches!(self, TokenError::Encoding { .. } | TokenError::KeyLoad { .. })
    }
}
