//! Filesystem object store for local deployment.
//!
//! Objects live at `<root>/<bucket>/<key>`. Signed URLs point back at this
//! server's `/objects` route and carry an HMAC over bucket, key and expiry.

use crate::ports::storage::ObjectStorePort;
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::error::Error;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum FsStoreError {
    #[error("invalid object name {0:?}")]
    InvalidName(String),

    #[error("signed url expired")]
    Expired,

    #[error("signature mismatch")]
    BadSignature,

    #[error("object not found")]
    NotFound,

    #[error("invalid signing secret")]
    InvalidSecret,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Signs and verifies `/objects` URLs.
#[derive(Clone)]
pub struct UrlSigner {
    mac: HmacSha256,
}

impl UrlSigner {
    pub fn new(secret: &str) -> Result<Self, FsStoreError> {
        let mac =
            HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| FsStoreError::InvalidSecret)?;
        Ok(Self { mac })
    }

    fn mac_for(&self, bucket: &str, key: &str, expires: i64) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(format!("{}/{}:{}", bucket, key, expires).as_bytes());
        mac
    }

    pub fn sign(&self, bucket: &str, key: &str, expires: i64) -> String {
        hex::encode(self.mac_for(bucket, key, expires).finalize().into_bytes())
    }

    /// Constant-time check of `signature`, then of the expiry against `now`.
    pub fn verify(
        &self,
        bucket: &str,
        key: &str,
        expires: i64,
        signature: &str,
        now: i64,
    ) -> Result<(), FsStoreError> {
        let raw = hex::decode(signature).map_err(|_| FsStoreError::BadSignature)?;
        self.mac_for(bucket, key, expires)
            .verify_slice(&raw)
            .map_err(|_| FsStoreError::BadSignature)?;
        if now > expires {
            return Err(FsStoreError::Expired);
        }
        Ok(())
    }
}

/// FsObjectStore implements ObjectStorePort on a local directory.
#[derive(Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
    signer: UrlSigner,
}

impl FsObjectStore {
    pub fn new(
        root: PathBuf,
        public_base_url: impl Into<String>,
        signing_secret: &str,
    ) -> Result<Self, FsStoreError> {
        Ok(Self {
            root,
            public_base_url: public_base_url.into(),
            signer: UrlSigner::new(signing_secret)?,
        })
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, FsStoreError> {
        if !is_safe_name(bucket) || bucket.contains('/') {
            return Err(FsStoreError::InvalidName(bucket.to_string()));
        }
        if !is_safe_name(key) {
            return Err(FsStoreError::InvalidName(key.to_string()));
        }
        Ok(self.root.join(bucket).join(key))
    }

    /// Open an object after checking the signature and expiry from its URL.
    pub async fn open_signed(
        &self,
        bucket: &str,
        key: &str,
        expires: i64,
        signature: &str,
    ) -> Result<File, FsStoreError> {
        self.signer
            .verify(bucket, key, expires, signature, Utc::now().timestamp())?;
        let path = self.object_path(bucket, key)?;
        File::open(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FsStoreError::NotFound,
            _ => FsStoreError::Io(e),
        })
    }
}

/// Relative, non-empty, and free of `..` or root components.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

#[async_trait]
impl ObjectStorePort for FsObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        mut body: File,
        _content_type: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file_writer = BufWriter::new(File::create(&path).await?);
        tokio::io::copy(&mut body, &mut file_writer).await?;
        file_writer.flush().await?;
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.object_path(bucket, key)?;
        let expires = Utc::now().timestamp() + ttl.as_secs() as i64;
        let signature = self.signer.sign(bucket, key, expires);
        Ok(format!(
            "{}/objects/{}/{}?expires={}&signature={}",
            self.public_base_url, bucket, key, expires, signature
        ))
    }
}
