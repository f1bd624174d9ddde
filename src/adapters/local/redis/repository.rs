//! Redis VideoRepository implementation.

use super::error::RepositoryError;
use super::pool::RedisPool;
use super::VIDEO_PREFIX;
use crate::domain::video::Video;
use crate::ports::repository::VideoRepository;
use async_trait::async_trait;
use deadpool_redis::redis::{AsyncCommands, ExistenceCheck, SetOptions};
use uuid::Uuid;

fn video_key(id: Uuid) -> String {
    format!("{}{}", VIDEO_PREFIX, id)
}

/// SET with an existence condition. Returns false when the condition failed.
async fn set_video(
    pool: &RedisPool,
    video: &Video,
    check: ExistenceCheck,
) -> Result<bool, RepositoryError> {
    let mut conn = pool.pool.get().await?;
    let json = serde_json::to_string(video)?;
    let reply: Option<String> = conn
        .set_options(video_key(video.id), json, SetOptions::default().conditional_set(check))
        .await?;
    Ok(reply.is_some())
}

#[async_trait]
impl VideoRepository for RedisPool {
    async fn create_video(
        &self,
        video: &Video,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !set_video(self, video, ExistenceCheck::NX).await? {
            return Err(RepositoryError::AlreadyExists(video.id).into());
        }
        Ok(())
    }

    async fn get_video(
        &self,
        id: Uuid,
    ) -> Result<Option<Video>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(RepositoryError::from)?;
        let json: Option<String> = conn
            .get(video_key(id))
            .await
            .map_err(RepositoryError::from)?;
        match json {
            Some(data) => Ok(Some(
                serde_json::from_str(&data).map_err(RepositoryError::from)?,
            )),
            None => Ok(None),
        }
    }

    async fn update_video(
        &self,
        video: &Video,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // A single SET XX replaces the whole record or nothing.
        if !set_video(self, video, ExistenceCheck::XX).await? {
            return Err(RepositoryError::Missing(video.id).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            video_key(id),
            "tubely:video:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_record_json_keeps_raw_location() {
        let mut video = Video::new_draft(Uuid::new_v4(), "title".into(), "desc".into());
        video.video_url = Some("tubely-videos,landscape/ab.mp4".into());
        let json = serde_json::to_string(&video).unwrap();
        let back: Video = serde_json::from_str(&json).unwrap();
        assert_eq!(back, video);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_create_get_update_against_redis() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".into());
        let repo = RedisPool::new(&url).unwrap();
        let mut video = Video::new_draft(Uuid::new_v4(), "t".into(), "".into());

        assert!(repo.update_video(&video).await.is_err());
        repo.create_video(&video).await.unwrap();
        assert!(repo.create_video(&video).await.is_err());

        video.thumbnail_url = Some("http://x/assets/a.png".into());
        repo.update_video(&video).await.unwrap();
        assert_eq!(repo.get_video(video.id).await.unwrap(), Some(video));
        assert_eq!(repo.get_video(Uuid::new_v4()).await.unwrap(), None);
    }
}
