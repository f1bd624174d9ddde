//! Redis error types for the local adapter.

use deadpool_redis::CreatePoolError;

pub type RedisError = deadpool_redis::redis::RedisError;
pub type PoolError = deadpool_redis::PoolError;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Create pool error: {0}")]
    CreatePool(#[from] CreatePoolError),

    #[error("video {0} already exists")]
    AlreadyExists(uuid::Uuid),

    #[error("video {0} does not exist")]
    Missing(uuid::Uuid),
}
