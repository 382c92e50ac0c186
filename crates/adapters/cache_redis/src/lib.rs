//! # farmhub-adapter-cache-redis
//!
//! Redis adapter — implements the `ReadingCache` port.
//!
//! ## Responsibilities
//! - Keep the latest value per sensor under `sensor:{sensor_id}`
//! - Serve those values to the rule engine as raw cached strings
//!
//! ## Dependency rule
//! Depends on `farmhub-app` (for the port) and `farmhub-domain`.
//! Never imported by them.

pub mod config;
pub mod error;
pub mod store;

pub use config::RedisConfig;
pub use error::CacheError;
pub use store::RedisReadingCache;
