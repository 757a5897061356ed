//! Email verification and password reset tokens

mod service;

#[cfg(test)]
mod tests;

pub use service::{SpecialTokenService, SpecialTokenServiceConfig};
