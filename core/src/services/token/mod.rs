//! JWT signing, parsing and verification
//!
//! - [`TokenCodec`] signs and parses tokens (HMAC or RS256)
//! - [`TokenVerifier`] adds expiry, type and blacklist checks on top
//! - [`Rs256KeyManager`] loads PEM key pairs for asymmetric signing

mod codec;
mod config;
mod key_manager;
mod verifier;

#[cfg(test)]
mod tests;

pub use codec::{hash_token, TokenCodec};
pub use config::TokenConfig;
pub use key_manager::Rs256KeyManager;
pub use verifier::TokenVerifier;
