//! Local adapters for single-host deployment.

pub mod fs;
#[cfg(feature = "local")]
pub mod redis;

pub use fs::{FsObjectStore, FsStoreError};
#[cfg(feature = "local")]
pub use redis::RedisPool;
