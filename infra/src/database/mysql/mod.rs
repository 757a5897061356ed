//! MySQL implementations of the core store traits

pub mod session_store_impl;

pub use session_store_impl::MySqlRefreshSessionStore;
