//! # SessionGuard Core
//!
//! Token lifecycle and session management for SessionGuard: JWT signing and
//! verification, refresh token rotation, access token revocation and
//! single-use tokens. Persistence is reached through the store traits in
//! [`repositories`]; the infrastructure crate provides MySQL and Redis
//! implementations, and in-memory ones live here.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::entities::{
    Claims, IssuedToken, RefreshSession, RevocationEntry, RevocationReason, RotationResponse,
    SessionMetadata, SessionState, SessionView, SpecialTokenKind, TokenPair, TokenSubject,
    TokenType,
};
pub use errors::{DomainError, DomainResult, TokenError};
pub use repositories::{
    ExpiringStore, InMemoryExpiringStore, InMemorySessionStore, InMemoryUserDirectory,
    RefreshSessionStore, UserDirectory,
};
pub use services::{
    CleanupResult, RevocationRegistry, SessionManager, SessionRef, SpecialTokenService,
    TokenCleanupService, TokenCodec, TokenVerifier,
};
