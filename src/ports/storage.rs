use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;

/// Durable blob storage for processed videos.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    /// Upload the whole of `body` as a single object. Never retried here.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: File,
        content_type: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// A URL granting unauthenticated read access to one object for `ttl`.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}

#[async_trait]
impl<T: ObjectStorePort + ?Sized> ObjectStorePort for Arc<T> {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: File,
        content_type: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).put_object(bucket, key, body, content_type).await
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        (**self).presign_get(bucket, key, ttl).await
    }
}
