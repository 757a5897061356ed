//! Refresh session lifecycle: issue, rotate, revoke, list

mod manager;


pub use manager::{SessionManager, SessionManagerConfig, SessionRef};
