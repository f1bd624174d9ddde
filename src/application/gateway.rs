use crate::domain::video::{StorageLocation, Video};
use crate::ports::storage::ObjectStorePort;
use std::error::Error;
use std::time::Duration;
use tokio::fs::File;
use tracing::debug;

/// Object Store Gateway: writes videos under a deterministic key and turns
/// persisted locations into short-lived signed URLs.
pub struct ObjectStoreGateway<S> {
    store: S,
    bucket: String,
    signed_url_ttl: Duration,
}

impl<S: ObjectStorePort> ObjectStoreGateway<S> {
    pub fn new(store: S, bucket: impl Into<String>, signed_url_ttl: Duration) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            signed_url_ttl,
        }
    }

    /// Upload `body` as `key` in the configured bucket.
    pub async fn put(
        &self,
        key: &str,
        body: File,
        content_type: &str,
    ) -> Result<StorageLocation, Box<dyn Error + Send + Sync>> {
        self.store
            .put_object(&self.bucket, key, body, content_type)
            .await?;
        Ok(StorageLocation::new(self.bucket.clone(), key))
    }

    pub async fn signed_url(
        &self,
        location: &StorageLocation,
        ttl: Duration,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.store
            .presign_get(&location.bucket, &location.key, ttl)
            .await
    }

    /// Read-side transform of a record: replace a stored `bucket,key` with a
    /// freshly signed URL.
    ///
    /// Records without a video, or whose value is not a location, come back
    /// untouched.
    pub async fn sign_video(&self, mut video: Video) -> Result<Video, Box<dyn Error + Send + Sync>> {
        let Some(location) = video.video_url.as_deref().and_then(StorageLocation::parse) else {
            return Ok(video);
        };
        let url = self.signed_url(&location, self.signed_url_ttl).await?;
        debug!(video_id = %video.id, key = %location.key, "signed video url");
        video.video_url = Some(url);
        Ok(video)
    }
}
