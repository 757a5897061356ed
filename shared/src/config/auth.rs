//! Token, session and revocation configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

const DEFAULT_JWT_SECRET: &str = "development-secret-please-change-in-production";

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret key for HMAC signing
    pub secret: String,

    /// Signing algorithm (HS256, HS384, HS512 or RS256)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// PEM private key path (RS256 only)
    #[serde(default)]
    pub private_key_path: Option<String>,

    /// PEM public key path (RS256 only)
    #[serde(default)]
    pub public_key_path: Option<String>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_JWT_SECRET),
            algorithm: default_algorithm(),
            issuer: String::from("sessionguard"),
            audience: String::from("sessionguard-api"),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            private_key_path: None,
            public_key_path: None,
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or(defaults.algorithm),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            access_token_expiry: env_or("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH").ok(),
            public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH").ok(),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Set the signing algorithm name
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// Refresh session persistence and sweep configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Upper bound for a single persistence call in milliseconds
    pub store_timeout_ms: u64,

    /// Days to keep expired or revoked session rows before the retention sweep deletes them
    pub retention_days: i64,

    /// How often the background sweep runs, in seconds
    pub cleanup_interval_seconds: u64,

    /// Whether the background sweep runs at all
    #[serde(default = "default_true")]
    pub cleanup_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: 2000,
            retention_days: 30,
            cleanup_interval_seconds: 3600,
            cleanup_enabled: true,
        }
    }
}

impl SessionConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store_timeout_ms: env_or("SESSION_STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            retention_days: env_or("SESSION_RETENTION_DAYS", defaults.retention_days),
            cleanup_interval_seconds: env_or("TOKEN_CLEANUP_INTERVAL", defaults.cleanup_interval_seconds),
            cleanup_enabled: env_or("TOKEN_CLEANUP_ENABLED", defaults.cleanup_enabled),
        }
    }
}

/// Access token blacklist configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevocationConfig {
    /// Seconds a blacklist entry outlives the token it blocks
    pub buffer_seconds: i64,

    /// Key prefix inside the expiring store
    #[serde(default = "default_revocation_prefix")]
    pub key_prefix: String,
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            buffer_seconds: 60,
            key_prefix: default_revocation_prefix(),
        }
    }
}

impl RevocationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            buffer_seconds: env_or("REVOCATION_BUFFER_SECONDS", 60),
            ..Default::default()
        }
    }
}

/// Email verification / password reset token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpecialTokenConfig {
    /// Email verification token lifetime in seconds
    pub email_verification_ttl: i64,

    /// Password reset token lifetime in seconds
    pub password_reset_ttl: i64,

    /// Key prefix inside the expiring store
    #[serde(default = "default_special_prefix")]
    pub key_prefix: String,
}

impl Default for SpecialTokenConfig {
    fn default() -> Self {
        Self {
            email_verification_ttl: 86400, // 24 hours
            password_reset_ttl: 3600,      // 1 hour
            key_prefix: default_special_prefix(),
        }
    }
}

impl SpecialTokenConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            email_verification_ttl: env_or("EMAIL_VERIFICATION_TTL", defaults.email_verification_ttl),
            password_reset_ttl: env_or("PASSWORD_RESET_TTL", defaults.password_reset_ttl),
            key_prefix: defaults.key_prefix,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Refresh session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Blacklist configuration
    #[serde(default)]
    pub revocation: RevocationConfig,

    /// Single-use token configuration
    #[serde(default)]
    pub special_tokens: SpecialTokenConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            session: SessionConfig::from_env(),
            revocation: RevocationConfig::from_env(),
            special_tokens: SpecialTokenConfig::from_env(),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_true() -> bool {
    true
}

fn default_revocation_prefix() -> String {
    String::from("revoked")
}

fn default_special_prefix() -> String {
    String::from("single_use")
}
