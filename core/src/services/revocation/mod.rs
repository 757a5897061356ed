//! Blacklist of tokens revoked before their natural expiry

mod registry;


pub use registry::{RevocationRegistry, RevocationRegistryConfig};
