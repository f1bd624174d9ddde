//! HTTP inbound adapter.

pub mod auth;
pub mod objects;
pub mod videos;

use crate::adapters::local::FsObjectStore;
use crate::application::ingest::IngestService;
use crate::application::thumbnail::ThumbnailService;
use crate::ports::media::{FastStartRemuxer, MediaProbe};
use crate::ports::repository::VideoRepository;
use crate::ports::storage::ObjectStorePort;
use auth::TokenKeys;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub type SharedProbe = Arc<dyn MediaProbe>;
pub type SharedRemuxer = Arc<dyn FastStartRemuxer>;
pub type SharedRepository = Arc<dyn VideoRepository>;
pub type SharedStore = Arc<dyn ObjectStorePort>;

pub type AppIngestService = IngestService<SharedProbe, SharedRemuxer, SharedRepository, SharedStore>;
pub type AppThumbnailService = ThumbnailService<SharedRepository>;

#[derive(Clone)]
pub struct AppState {
    pub ingest: Arc<AppIngestService>,
    pub thumbnails: Arc<AppThumbnailService>,
    pub repo: SharedRepository,
    pub tokens: Arc<TokenKeys>,
    /// Set when objects live on local disk and are served by this process.
    pub fs_store: Option<Arc<FsObjectStore>>,
}

pub fn router(state: AppState, assets_root: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/videos", post(videos::create_video))
        .route("/api/videos/:video_id", get(videos::get_video))
        .route("/api/video_upload/:video_id", post(videos::upload_video))
        .route("/api/thumbnail_upload/:video_id", post(videos::upload_thumbnail))
        .route("/objects/:bucket/*key", get(objects::get_object))
        .nest_service("/assets", ServeDir::new(assets_root))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
