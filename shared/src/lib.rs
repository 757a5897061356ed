//! Shared utilities and common types for SessionGuard
//!
//! This crate provides common functionality used across all workspace crates:
//! - Configuration types
//! - Outward error response structures
//! - Utility functions (bearer header parsing, blank-claim checks)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, DatabaseConfig, Environment, JwtConfig, LogFormat,
    LoggingConfig, RevocationConfig, SessionConfig, SpecialTokenConfig,
};
pub use errors::{error_codes, ApiResult, ErrorResponse, IntoErrorResponse};
pub use utils::{header, validation};
