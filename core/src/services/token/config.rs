//! Configuration for the token codec

use std::str::FromStr;

use chrono::Duration;
use jsonwebtoken::Algorithm;
use sg_shared::config::JwtConfig;

use crate::errors::{DomainError, TokenError};

use super::key_manager::Rs256KeyManager;

/// Configuration for the token codec
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC signing secret (ignored for RS256)
    pub secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Expected `iss` claim
    pub issuer: String,
    /// Expected `aud` claim
    pub audience: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// PEM private key path (RS256 only)
    pub private_key_path: Option<String>,
    /// PEM public key path (RS256 only)
    pub public_key_path: Option<String>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: "development-secret-please-change-in-production".to_string(),
            algorithm: Algorithm::HS256,
            issuer: "sessionguard".to_string(),
            audience: "sessionguard-api".to_string(),
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            private_key_path: None,
            public_key_path: None,
        }
    }
}

impl TokenConfig {
    /// HMAC configuration with the given secret and default lifetimes
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Load the RS256 key pair if the algorithm needs one
    ///
    /// # Returns
    /// * `Ok(None)` - HMAC algorithm, no keys needed
    /// * `Ok(Some(manager))` - Keys loaded from the configured paths
    /// * `Err(DomainError)` - RS256 without both paths, or unreadable keys
    pub fn load_key_manager(&self) -> Result<Option<Rs256KeyManager>, DomainError> {
        if self.algorithm != Algorithm::RS256 {
            return Ok(None);
        }

        match (&self.private_key_path, &self.public_key_path) {
            (Some(private_key), Some(public_key)) => {
                Rs256KeyManager::new(private_key, public_key).map(Some)
            }
            _ => Err(DomainError::Token(TokenError::KeyLoad {
                message: "RS256 algorithm requires both key paths".to_string(),
            })),
        }
    }
}

impl TryFrom<&JwtConfig> for TokenConfig {
    type Error = DomainError;

    fn try_from(config: &JwtConfig) -> Result<Self, Self::Error> {
        let algorithm = Algorithm::from_str(&config.algorithm).map_err(|_| {
            DomainError::Validation {
                message: format!("Unsupported JWT algorithm: {}", config.algorithm),
            }
        })?;

        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 | Algorithm::RS256
        ) {
            return Err(DomainError::Validation {
                message: format!("Unsupported JWT algorithm: {}", config.algorithm),
            });
        }

        if config.access_token_expiry <= 0 || config.refresh_token_expiry <= 0 {
            return Err(DomainError::Validation {
                message: "Token lifetimes must be positive".to_string(),
            });
        }

        let lifetime = |seconds: i64| {
            Duration::try_seconds(seconds).ok_or_else(|| DomainError::Validation {
                message: format!("Token lifetime of {} seconds is out of range", seconds),
            })
        };

        Ok(Self {
            secret: config.secret.clone(),
            algorithm,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_ttl: lifetime(config.access_token_expiry)?,
            refresh_token_ttl: lifetime(config.refresh_token_expiry)?,
            private_key_path: config.private_key_path.clone(),
            public_key_path: config.public_key_path.clone(),
        })
    }
}
