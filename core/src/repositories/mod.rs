pub mod expiring;
pub mod session;
pub mod user;

pub use expiring::{ExpiringStore, InMemoryExpiringStore};
pub use session::{InMemorySessionStore, RefreshSessionStore};
pub use user::{InMemoryUserDirectory, UserDirectory};
