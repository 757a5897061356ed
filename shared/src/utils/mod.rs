//! Common utility functions

pub mod header;
pub mod validation;

pub use header::extract_bearer_token;
pub use validation::not_blank;
