//! # Infrastructure Layer
//!
//! Concrete persistence for the SessionGuard token core and the wiring that
//! assembles its services.
//!
//! ## Architecture
//!
//! - **Database**: MySQL refresh session store using SQLx
//! - **Cache**: Redis client and the shared expiring store backing the
//!   access-token blacklist and single-use token markers
//! - **Logging**: `tracing-subscriber` initialisation from [`LoggingConfig`]
//!
//! [`initialize`] connects both backends and returns a [`SessionServices`]
//! container; [`load_config`] reads `.env` files and the environment.

use std::sync::Arc;

use anyhow::Context;
use sg_core::clock::{Clock, SystemClock};
use sg_core::repositories::{ExpiringStore, UserDirectory};
use sg_core::services::{
    RevocationRegistry, RevocationRegistryConfig, SessionManager, SessionManagerConfig,
    SpecialTokenService, SpecialTokenServiceConfig, TokenCleanupConfig, TokenCleanupService,
    TokenCodec, TokenConfig, TokenVerifier,
};
use sg_shared::config::AppConfig;

// Re-export core error types for convenience
pub use sg_core::errors::{DomainError, DomainResult, TokenError};

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Cache module - Redis client and expiring store
pub mod cache;

/// Logging initialisation
pub mod logging;

/// Configuration module for infrastructure services
pub mod config {
    //! Re-exports of the shared configuration consumed by this crate
    pub use sg_shared::config::{AppConfig, CacheConfig, DatabaseConfig, LoggingConfig};
}

pub use cache::{RedisClient, RedisExpiringStore};
pub use config::LoggingConfig;
pub use database::{DatabasePool, MySqlRefreshSessionStore, PoolStatistics};

/// Session manager backed by MySQL
pub type MySqlSessionManager = SessionManager<MySqlRefreshSessionStore>;

/// Cleanup service backed by MySQL
pub type MySqlTokenCleanupService = TokenCleanupService<MySqlRefreshSessionStore>;

/// Every token service, wired against MySQL and Redis
#[derive(Clone)]
pub struct SessionServices {
    pub codec: Arc<TokenCodec>,
    pub registry: Arc<RevocationRegistry>,
    pub verifier: Arc<TokenVerifier>,
    pub sessions: Arc<MySqlSessionManager>,
    pub special_tokens: Arc<SpecialTokenService>,
    pub cleanup: Arc<MySqlTokenCleanupService>,
    pub database: DatabasePool,
    pub redis: RedisClient,
}

impl SessionServices {
    /// Close the database pool; the Redis connection drops with the container
    pub async fn shutdown(&self) {
        self.database.close().await;
    }
}

/// Initialize infrastructure services
///
/// This function sets up:
/// - The MySQL connection pool and refresh session store
/// - The Redis connection and the shared expiring store
/// - Codec, verifier, registry, session manager, single-use token and
///   cleanup services
///
/// User records belong to the account service, so the directory used to
/// reload subjects on rotation is passed in.
///
/// Refuses to start a production environment with the development JWT secret.
pub async fn initialize(
    config: &AppConfig,
    users: Arc<dyn UserDirectory>,
) -> anyhow::Result<SessionServices> {
    tracing::info!(environment = %config.environment, "Initializing session services...");

    if config.environment.is_production() && config.auth.jwt.is_using_default_secret() {
        return Err(InfrastructureError::Config(
            "JWT secret is the development default".to_string(),
        )
        .into());
    }
    for warning in config.production_warnings() {
        tracing::warn!("{}", warning);
    }

    let token_config = TokenConfig::try_from(&config.auth.jwt).context("Invalid JWT configuration")?;
    let codec = Arc::new(TokenCodec::new(token_config).context("Failed to build token codec")?);

    let database = DatabasePool::new(config.database.clone())
        .await
        .context("Failed to connect to MySQL")?;
    let redis = RedisClient::new(config.cache.clone())
        .await
        .context("Failed to connect to Redis")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let expiring: Arc<dyn ExpiringStore> = Arc::new(RedisExpiringStore::new(redis.clone(), clock.clone()));
    let session_store = Arc::new(MySqlRefreshSessionStore::new(database.get_pool().clone()));

    let session_config = &config.auth.session;
    let registry = Arc::new(RevocationRegistry::new(
        codec.clone(),
        expiring.clone(),
        clock.clone(),
        RevocationRegistryConfig::from_config(&config.auth.revocation, session_config),
    ));
    let verifier = Arc::new(TokenVerifier::new(codec.clone(), registry.clone(), clock.clone()));
    let sessions = Arc::new(SessionManager::new(
        codec.clone(),
        verifier.clone(),
        registry.clone(),
        session_store.clone(),
        users,
        clock.clone(),
        SessionManagerConfig::from(session_config),
    ));
    let special_tokens = Arc::new(SpecialTokenService::new(
        codec.clone(),
        verifier.clone(),
        expiring,
        clock.clone(),
        SpecialTokenServiceConfig::from_config(&config.auth.special_tokens, session_config),
    ));
    let cleanup = Arc::new(TokenCleanupService::new(
        session_store,
        registry.clone(),
        special_tokens.clone(),
        clock,
        TokenCleanupConfig::from(session_config),
    ));

    tracing::info!(
        algorithm = ?codec.algorithm(),
        "Session services initialized successfully"
    );

    Ok(SessionServices {
        codec,
        registry,
        verifier,
        sessions,
        special_tokens,
        cleanup,
        database,
        redis,
    })
}

/// Load application configuration from `.env` files and the environment
///
/// The environment-specific file (`.env.development`, `.env.production`...)
/// is read first so its values win over the generic `.env`.
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    let environment = sg_shared::config::Environment::from_env();
    dotenvy::from_filename(environment.env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    TokenConfig::try_from(&config.auth.jwt)
        .map_err(|e| InfrastructureError::Config(e.to_string()))?;
    Ok(config)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Storage {
            message: err.to_string(),
        }
    }
}
