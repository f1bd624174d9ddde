use super::classifier::AspectClassifier;
use super::gateway::ObjectStoreGateway;
use super::staging::{stage_stream, StagedFile, StagingError};
use crate::domain::aspect::AspectClass;
use crate::domain::upload::{accepted_media_type, video_object_key, MediaUpload, VIDEO_CONTENT_TYPES};
use crate::domain::video::Video;
use crate::error::IngestError;
use crate::ports::media::{fast_start_output_path, FastStartRemuxer, MediaProbe};
use crate::ports::repository::VideoRepository;
use crate::ports::storage::ObjectStorePort;
use axum::BoxError;
use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use std::path::PathBuf;
use tempfile::TempPath;
use tokio::fs::File;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Prefix of staged upload files; names stay unique across concurrent requests.
const STAGING_PREFIX: &str = "tubely-upload.";

/// Ingestion Orchestrator: stage, classify, remux, upload, persist.
///
/// One call runs every step in order on the calling task.
pub struct IngestService<P, M, R, S> {
    classifier: AspectClassifier<P>,
    remuxer: M,
    repo: R,
    gateway: ObjectStoreGateway<S>,
    scratch_dir: PathBuf,
    max_video_bytes: u64,
}

impl<P, M, R, S> IngestService<P, M, R, S>
where
    P: MediaProbe,
    M: FastStartRemuxer,
    R: VideoRepository,
    S: ObjectStorePort,
{
    pub fn new(
        probe: P,
        remuxer: M,
        repo: R,
        gateway: ObjectStoreGateway<S>,
        scratch_dir: PathBuf,
        max_video_bytes: u64,
    ) -> Self {
        Self {
            classifier: AspectClassifier::new(probe),
            remuxer,
            repo,
            gateway,
            scratch_dir,
            max_video_bytes,
        }
    }

    pub fn gateway(&self) -> &ObjectStoreGateway<S> {
        &self.gateway
    }

    /// Ingest a video upload for `video_id` on behalf of `requester_id`.
    ///
    /// Returns the updated record with its location already signed. The record is
    /// only written after the object upload succeeds.
    #[instrument(skip(self, upload), fields(video_id = %video_id, user_id = %requester_id))]
    pub async fn ingest<B, E>(
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

        let content_type = accepted_media_type(upload.content_type.as_deref(), VIDEO_CONTENT_TYPES)
            .ok_or_else(|| {
                IngestError::UnsupportedMediaType(upload.content_type.clone().unwrap_or_default())
            })?;
        let extension = upload.extension();

        info!("uploading video");
        let staged = self.stage(upload.body).await?;

        let aspect = match self.classifier.classify(staged.path()).await {
            Ok(aspect) => aspect,
            Err(e) => {
                warn!(error = %e, "aspect classification failed, storing as other");
                AspectClass::Other
            }
        };

        // Owns the remux output from before the tool starts, so a partial file
        // left by a crashed ffmpeg is removed too.
        let _remux_guard = TempPath::from_path(fast_start_output_path(staged.path()));
        let remuxed_path = self
            .remuxer
            .remux_fast_start(staged.path())
            .await
            .map_err(|e| IngestError::Processing(format!("fast-start remux failed: {}", e)))?;
        let _remuxed_guard = (remuxed_path != fast_start_output_path(staged.path()))
            .then(|| TempPath::from_path(remuxed_path.clone()));

        let remuxed = File::open(&remuxed_path)
            .await
            .map_err(|e| IngestError::internal("failed to open remuxed file", e))?;

        let key = video_object_key(aspect, &extension);
        let location = self
            .gateway
            .put(&key, remuxed, &content_type)
            .await
            .map_err(|e| IngestError::internal("failed to upload video to object store", e))?;
        info!(bucket = %location.bucket, key = %location.key, %aspect, size = staged.size(), "video stored");

        video.video_url = Some(location.to_string());
        video.updated_at = Utc::now();
        if let Err(e) = self.repo.update_video(&video).await {
            error!(
                bucket = %location.bucket,
                key = %location.key,
                "record update failed after upload; object is orphaned"
            );
            return Err(IngestError::internal("failed to update video record", e));
        }

        self.gateway
            .sign_video(video)
            .await
            .map_err(|e| IngestError::internal("failed to sign video url", e))
    }

    async fn stage<B, E>(&self, body: B) -> Result<StagedFile, IngestError>
    where
        B: Stream<Item = Result<Bytes, E>>,
        E: Into<BoxError>,
    {
        stage_stream(
            body,
            &self.scratch_dir,
            STAGING_PREFIX,
            ".mp4",
            self.max_video_bytes,
        )
        .await
        .map_err(|e| match e {
            StagingError::TooLarge { limit } => IngestError::PayloadTooLarge { limit },
            StagingError::Body(e) => {
                IngestError::BadRequest(format!("unable to read upload body: {}", e))
            }
            StagingError::Io(e) => IngestError::internal("failed to stage upload", e),
        })
    }
}

/// Fetch `video_id` and check that `requester_id` owns it.
pub(crate) async fn load_owned_video<R: VideoRepository>(
    repo: &R,
    video_id: Uuid,
    requester_id: Uuid,
) -> Result<Video, IngestError> {
    let video = repo
        .get_video(video_id)
        .await
        .map_err(|e| IngestError::internal("failed to read video record", e))?
        .ok_or(IngestError::NotFound(video_id))?;
    if !video.is_owned_by(requester_id) {
        return Err(IngestError::Unauthorized(
            "requester does not own this video".to_string(),
        ));
    }
    Ok(video)
}
