//! Redis adapter for local deployment.
//!
//! Video records are stored as JSON strings under `tubely:video:<id>`.

mod error;
mod pool;
mod repository;

pub use error::RepositoryError;
pub use pool::RedisPool;

const VIDEO_PREFIX: &str = "tubely:video:";
