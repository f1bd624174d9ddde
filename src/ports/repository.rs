use crate::domain::video::Video;
use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

/// Metadata persistence for video records.
///
/// A single `update_video` is expected to be atomic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create_video(&self, video: &Video) -> Result<(), Box<dyn Error + Send + Sync>>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, Box<dyn Error + Send + Sync>>;

    /// Replace the stored record with `video`.
    async fn update_video(&self, video: &Video) -> Result<(), Box<dyn Error + Send + Sync>>;
}

#[async_trait]
impl<T: VideoRepository + ?Sized> VideoRepository for Arc<T> {
    async fn create_video(&self, video: &Video) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).create_video(video).await
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, Box<dyn Error + Send + Sync>> {
        (**self).get_video(id).await
    }

    async fn update_video(&self, video: &Video) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).update_video(video).await
    }
}
