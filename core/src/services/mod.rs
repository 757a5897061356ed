//! Token and session services.

pub mod cleanup;
pub mod revocation;
pub mod session;
pub mod special_token;
pub mod token;

mod store_call;

#[cfg(test)]
pub(crate) mod test_support;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use revocation::{RevocationRegistry, RevocationRegistryConfig};
pub use session::{SessionManager, SessionManagerConfig, SessionRef};
pub use special_token::{SpecialTokenService, SpecialTokenServiceConfig};
pub use token::{hash_token, Rs256KeyManager, TokenCodec, TokenConfig, TokenVerifier};
