//! Configuration loaded from the environment.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upload ceiling for videos (1 GiB).
pub const DEFAULT_MAX_VIDEO_BYTES: u64 = 1 << 30;
/// Upload ceiling for thumbnails (10 MiB).
pub const DEFAULT_MAX_THUMBNAIL_BYTES: u64 = 10 << 20;
/// Lifetime of signed video URLs handed to clients.
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} env var required")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Which object store backs video storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    /// Objects under a local directory, served back through signed `/objects` URLs.
    Fs { root: PathBuf, signing_secret: String },
}

#[derive(Clone, Debug)]
pub struct S3Settings {
    /// Bucket every video is written to
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO, LocalStack)
    pub endpoint: Option<String>,
}

/// Configuration for the ingestion service.
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: u16,
    /// Base URL clients use to reach this server
    pub public_base_url: String,
    /// Directory thumbnails are written to and served from
    pub assets_root: PathBuf,
    /// Unserved directory thumbnail bodies are received into; same filesystem
    /// as `assets_root`
    pub assets_staging_dir: PathBuf,
    /// HMAC secret for access tokens
    pub jwt_secret: String,
    /// Redis connection URL for video records
    pub redis_url: String,
    pub storage: StorageBackend,
    pub s3: S3Settings,
    pub ffprobe_bin: String,
    pub ffmpeg_bin: String,
    pub signed_url_ttl: Duration,
    pub max_video_bytes: u64,
    pub max_thumbnail_bytes: u64,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let port: u16 = parse_var(&lookup, "PORT", 8091)?;
        let storage = match var("STORAGE_BACKEND", "s3").to_ascii_lowercase().as_str() {
            "s3" => StorageBackend::S3,
            "fs" => StorageBackend::Fs {
                root: PathBuf::from(var("FS_STORAGE_ROOT", "./objects")),
                signing_secret: required("SIGNING_SECRET")?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let assets_root = PathBuf::from(var("ASSETS_ROOT", "./assets"));
        let assets_staging_dir = lookup("ASSETS_STAGING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_staging_dir(&assets_root));

        Ok(Self {
            addr: var("ADDR", "127.0.0.1"),
            port,
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port))
                .trim_end_matches('/')
                .to_string(),
            assets_root,
            assets_staging_dir,
            jwt_secret: required("JWT_SECRET")?,
            redis_url: var("REDIS_URL", "redis://127.0.0.1/"),
            storage,
            s3: S3Settings {
                bucket: required("S3_BUCKET")?,
                region: var("S3_REGION", "us-east-1"),
                endpoint: lookup("S3_ENDPOINT").filter(|e| !e.is_empty()),
            },
            ffprobe_bin: var("FFPROBE_BIN", "ffprobe"),
            ffmpeg_bin: var("FFMPEG_BIN", "ffmpeg"),
            signed_url_ttl: Duration::from_secs(parse_var(
                &lookup,
                "SIGNED_URL_TTL_SECS",
                DEFAULT_SIGNED_URL_TTL.as_secs(),
            )?),
            max_video_bytes: parse_var(&lookup, "MAX_VIDEO_BYTES", DEFAULT_MAX_VIDEO_BYTES)?,
            max_thumbnail_bytes: parse_var(
                &lookup,
                "MAX_THUMBNAIL_BYTES",
                DEFAULT_MAX_THUMBNAIL_BYTES,
            )?,
        })
    }
}

/// `<parent>/.<name>-staging` next to the assets root, outside what is served.
fn default_staging_dir(assets_root: &Path) -> PathBuf {
    let name = assets_root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "assets".to_string());
    assets_root.with_file_name(format!(".{}-staging", name))
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("JWT_SECRET", "s"), ("S3_BUCKET", "videos")]))
                .unwrap();
        assert_eq!(config.port, 8091);
        assert_eq!(config.public_base_url, "http://localhost:8091");
        assert_eq!(config.storage, StorageBackend::S3);
        assert_eq!(config.signed_url_ttl, Duration::from_secs(60));
        assert_eq!(config.max_video_bytes, 1 << 30);
        assert_eq!(config.max_thumbnail_bytes, 10 << 20);
        assert_eq!(config.ffmpeg_bin, "ffmpeg");
        assert!(config.s3.endpoint.is_none());
        assert_eq!(config.assets_root, PathBuf::from("./assets"));
        assert_eq!(config.assets_staging_dir, PathBuf::from("./.assets-staging"));
    }

    #[test]
    fn test_staging_dir_sits_beside_assets_root() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("S3_BUCKET", "videos"),
            ("ASSETS_ROOT", "/srv/tubely/thumbs"),
        ]))
        .unwrap();
        assert_eq!(
            config.assets_staging_dir,
            PathBuf::from("/srv/tubely/.thumbs-staging")
        );
        assert!(!config.assets_staging_dir.starts_with(&config.assets_root));

        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("S3_BUCKET", "videos"),
            ("ASSETS_STAGING_DIR", "/var/tmp/thumbs"),
        ]))
        .unwrap();
        assert_eq!(config.assets_staging_dir, PathBuf::from("/var/tmp/thumbs"));
    }

    #[test]
    fn test_missing_required() {
        let err = Config::from_lookup(lookup_from(&[("S3_BUCKET", "videos")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_fs_backend_requires_signing_secret() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("S3_BUCKET", "videos"),
            ("STORAGE_BACKEND", "fs"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SIGNING_SECRET")));

        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("S3_BUCKET", "videos"),
            ("STORAGE_BACKEND", "FS"),
            ("SIGNING_SECRET", "k"),
            ("FS_STORAGE_ROOT", "/srv/objects"),
            ("PUBLIC_BASE_URL", "https://tubely.example/"),
        ]))
        .unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::Fs {
                root: PathBuf::from("/srv/objects"),
                signing_secret: "k".into()
            }
        );
        assert_eq!(config.public_base_url, "https://tubely.example");
    }

    #[test]
    fn test_invalid_number() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("S3_BUCKET", "videos"),
            ("MAX_VIDEO_BYTES", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "MAX_VIDEO_BYTES",
                ..
            }
        ));
    }
}
