//! Video record and upload handlers.

use super::auth::AuthUser;
use super::AppState;
use crate::application::ingest::load_owned_video;
use crate::domain::upload::MediaUpload;
use crate::domain::video::Video;
use crate::error::IngestError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

const VIDEO_FIELD: &str = "video";
const THUMBNAIL_FIELD: &str = "thumbnail";

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

fn parse_video_id(raw: &str) -> Result<Uuid, IngestError> {
    Uuid::parse_str(raw).map_err(|_| IngestError::BadRequest(format!("invalid video id {:?}", raw)))
}

pub async fn create_video(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<CreateVideoRequest>,
) -> Result<(StatusCode, Json<Video>), IngestError> {
    if request.title.trim().is_empty() {
        return Err(IngestError::BadRequest("title is required".to_string()));
    }
    let video = Video::new_draft(user_id, request.title, request.description);
    state
        .repo
        .create_video(&video)
        .await
        .map_err(|e| IngestError::internal("failed to create video record", e))?;
    info!(video_id = %video.id, user_id = %user_id, "video draft created");
    Ok((StatusCode::CREATED, Json(video)))
}

pub async fn get_video(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<String>,
) -> Result<Json<Video>, IngestError> {
    let video_id = parse_video_id(&video_id)?;
    let video = load_owned_video(&state.repo, video_id, user_id).await?;
    let video = state
        .ingest
        .gateway()
        .sign_video(video)
        .await
        .map_err(|e| IngestError::internal("failed to sign video url", e))?;
    Ok(Json(video))
}

pub async fn upload_video(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Video>, IngestError> {
    let video_id = parse_video_id(&video_id)?;
    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let video = state
            .ingest
            .ingest(video_id, user_id, MediaUpload::new(field, content_type, file_name))
            .await?;
        return Ok(Json(video));
    }
    Err(missing_field(VIDEO_FIELD))
}

pub async fn upload_thumbnail(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Video>, IngestError> {
    let video_id = parse_video_id(&video_id)?;
    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let video = state
            .thumbnails
            .upload(video_id, user_id, MediaUpload::new(field, content_type, file_name))
            .await?;
        return Ok(Json(video));
    }
    Err(missing_field(THUMBNAIL_FIELD))
}

async fn next_field(
    multipart: &mut Multipart,
) -> Result<Option<axum::extract::multipart::Field<'_>>, IngestError> {
    multipart
        .next_field()
        .await
        .map_err(|e| IngestError::BadRequest(format!("unable to parse multipart form: {}", e)))
}

fn missing_field(name: &str) -> IngestError {
    IngestError::BadRequest(format!("missing form field {:?}", name))
}
