//! Periodic sweep of stale sessions, blacklist entries and single-use markers

mod service;


pub use service::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
