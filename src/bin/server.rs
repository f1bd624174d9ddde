//! Server Binary - HTTP ingestion service
//!
//! Wires up:
//! - ffprobe/ffmpeg media adapters
//! - S3 or filesystem object storage
//! - Redis video records
//! - axum routes

use std::error::Error;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tubely::adapters::aws::S3Adapter;
use tubely::adapters::ffmpeg::{tool_available, FfmpegRemuxer, FfprobeAdapter};
use tubely::adapters::local::{FsObjectStore, RedisPool};
use tubely::application::gateway::ObjectStoreGateway;
use tubely::application::ingest::IngestService;
use tubely::application::thumbnail::ThumbnailService;
use tubely::config::{Config, StorageBackend};
use tubely::http::auth::TokenKeys;
use tubely::http::{self, AppState, SharedProbe, SharedRemuxer, SharedRepository, SharedStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tubely=info,tower_http=info")),
        )
        .init();

    for tool in [&config.ffprobe_bin, &config.ffmpeg_bin] {
        if !tool_available(tool) {
            warn!(%tool, "not found on PATH; uploads will fail until it is installed");
        }
    }

    // 1. Adapters
    let repo: SharedRepository = Arc::new(RedisPool::new(&config.redis_url)?);

    let (store, fs_store, backend) = match &config.storage {
        StorageBackend::S3 => (
            Arc::new(S3Adapter::from_settings(&config.s3).await) as SharedStore,
            None,
            "s3",
        ),
        StorageBackend::Fs {
            root,
            signing_secret,
        } => {
            tokio::fs::create_dir_all(root).await?;
            let fs = Arc::new(FsObjectStore::new(
                root.clone(),
                config.public_base_url.clone(),
                signing_secret,
            )?);
            (fs.clone() as SharedStore, Some(fs), "fs")
        }
    };
    tokio::fs::create_dir_all(&config.assets_root).await?;
    tokio::fs::create_dir_all(&config.assets_staging_dir).await?;

    // 2. Application Services
    let gateway = ObjectStoreGateway::new(store, config.s3.bucket.clone(), config.signed_url_ttl);
    let ingest = IngestService::new(
        Arc::new(FfprobeAdapter::new(config.ffprobe_bin.clone())) as SharedProbe,
        Arc::new(FfmpegRemuxer::new(config.ffmpeg_bin.clone())) as SharedRemuxer,
        repo.clone(),
        gateway,
        std::env::temp_dir(),
        config.max_video_bytes,
    );
    let thumbnails = ThumbnailService::new(
        repo.clone(),
        config.assets_root.clone(),
        config.assets_staging_dir.clone(),
        config.public_base_url.clone(),
        config.max_thumbnail_bytes,
    );

    // 3. HTTP Layer
    let state = AppState {
        ingest: Arc::new(ingest),
        thumbnails: Arc::new(thumbnails),
        repo,
        tokens: Arc::new(TokenKeys::new(&config.jwt_secret)),
        fs_store,
    };
    let app = http::router(state, &config.assets_root);

    // 4. Start Server
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port)).await?;
    info!(
        addr = %config.addr,
        port = config.port,
        storage = backend,
        bucket = %config.s3.bucket,
        "listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
