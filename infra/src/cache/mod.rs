//! Cache module for Redis-backed state
//!
//! Holds the Redis client and the expiring store that backs the access-token
//! blacklist and single-use token markers for every instance.

pub mod redis_client;
pub mod redis_expiring_store;


pub use redis_client::RedisClient;
pub use redis_expiring_store::RedisExpiringStore;

// Re-export commonly used types
pub use sg_shared::config::cache::CacheConfig;
