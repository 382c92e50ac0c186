//! Redis adapter error types.

use farmhub_domain::error::FarmHubError;

/// Errors specific to the Redis cache adapter.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The connection URL is invalid or the client could not be built.
    #[error("invalid Redis configuration")]
    Config(#[source] redis::RedisError),

    /// A command against the Redis server failed.
    #[error("Redis command failed")]
    Command(#[source] redis::RedisError),
}

impl From<CacheError> for FarmHubError {
    fn from(err: CacheError) -> Self {
        FarmHubError::Cache(Box::new(err))
    }
}
