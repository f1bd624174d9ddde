use super::ingest::load_owned_video;
use super::staging::{stage_stream, StagingError};
use crate::domain::upload::{accepted_media_type, thumbnail_file_name, MediaUpload, THUMBNAIL_CONTENT_TYPES};
use crate::domain::video::Video;
use crate::error::IngestError;
use crate::ports::repository::VideoRepository;
use axum::BoxError;
use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use std::path::PathBuf;
use tracing::{info, instrument};
use uuid::Uuid;

/// Stores thumbnails as files under the assets root, served at `/assets`.
///
/// Bodies are received in `staging_dir`, which must not be served and must sit
/// on the same filesystem as `assets_root` so that publishing is a rename.
pub struct ThumbnailService<R> {
    repo: R,
    assets_root: PathBuf,
    staging_dir: PathBuf,
    public_base_url: String,
    max_thumbnail_bytes: u64,
}

impl<R: VideoRepository> ThumbnailService<R> {
    pub fn new(
        repo: R,
        assets_root: PathBuf,
        staging_dir: PathBuf,
        public_base_url: impl Into<String>,
        max_thumbnail_bytes: u64,
    ) -> Self {
        Self {
            repo,
            assets_root,
            staging_dir,
            public_base_url: public_base_url.into(),
            max_thumbnail_bytes,
        }
    }

    /// Write the image under a random name and point the record at it.
    ///
    /// The image only becomes visible under its final name once fully received.
    #[instrument(skip(self, upload), fields(video_id = %video_id, user_id = %requester_id))]
    pub async fn upload<B, E>(
        &self,
        video_id: Uuid,
        requester_id: Uuid,
        upload: MediaUpload<B>,
    ) -> Result<Video, IngestError>
    where
        B: Stream<Item = Result<Bytes, E>>,
        E: Into<BoxError>,
    {
        let mut video = load_owned_video(&self.repo, video_id, requester_id).await?;

        accepted_media_type(upload.content_type.as_deref(), THUMBNAIL_CONTENT_TYPES).ok_or_else(
            || IngestError::UnsupportedMediaType(upload.content_type.clone().unwrap_or_default()),
        )?;
        let extension = upload.extension();

        let staged = stage_stream(
            upload.body,
            &self.staging_dir,
            "thumbnail.",
            &extension,
            self.max_thumbnail_bytes,
        )
        .await
        .map_err(|e| match e {
            StagingError::TooLarge { limit } => IngestError::PayloadTooLarge { limit },
            StagingError::Body(e) => {
                IngestError::BadRequest(format!("unable to read thumbnail body: {}", e))
            }
            StagingError::Io(e) => IngestError::internal("failed to stage thumbnail", e),
        })?;

        let file_name = thumbnail_file_name(&extension);
        let size = staged.size();
        staged
            .persist(&self.assets_root.join(&file_name))
            .map_err(|e| IngestError::internal("failed to store thumbnail", e))?;
        info!(file = %file_name, size, "thumbnail stored");

        video.thumbnail_url = Some(format!("{}/assets/{}", self.public_base_url, file_name));
        video.updated_at = Utc::now();
        self.repo
            .update_video(&video)
            .await
            .map_err(|e| IngestError::internal("failed to update video record", e))?;
        Ok(video)
    }
}
