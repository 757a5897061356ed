//! Domain-specific error types and error handling.

mod types;

pub use types::TokenError;

use sg_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Generic outward message for any failed refresh
pub const REFRESH_FAILURE_MESSAGE: &str = "Invalid or expired refresh token";

/// Generic outward message for any other failed token check
pub const TOKEN_FAILURE_MESSAGE: &str = "Invalid or expired token";

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Persistence collaborator failed
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// A bounded persistence call did not complete in time
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Shorthand for a storage failure with context
    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        DomainError::Storage {
            message: format!("{}: {}", context, err),
        }
    }

    /// Returns the token error kind if this is a token failure
    pub fn token_error(&self) -> Option<&TokenError> {
        match self {
            DomainError::Token(e) => Some(e),
            _ => None,
        }
    }

    /// True when the caller presented a token that must be rejected
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, DomainError::Token(e) if e.is_rejection())
    }

    /// True when the failure came from an unavailable collaborator
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DomainError::Storage { .. } | DomainError::Timeout { .. })
    }

    /// Outward response for the refresh endpoint
    pub fn to_refresh_response(&self) -> ErrorResponse {
        if self.is_auth_failure() {
            ErrorResponse::new(error_codes::INVALID_TOKEN, REFRESH_FAILURE_MESSAGE)
        } else {
            self.to_error_response()
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            e if e.is_auth_failure() => {
                ErrorResponse::new(error_codes::INVALID_TOKEN, TOKEN_FAILURE_MESSAGE)
            }
            DomainError::Validation { message } => {
                ErrorResponse::new(error_codes::VALIDATION_ERROR, message.clone())
            }
            e if e.is_unavailable() => ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
            ),
            _ => ErrorResponse::new(error_codes::INTERNAL_ERROR, "Internal server error"),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests;
