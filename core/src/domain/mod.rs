//! Domain layer containing the token and session entities.

pub mod entities;

pub use entities::*;
