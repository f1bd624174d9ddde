use crate::config::S3Settings;
use crate::ports::storage::ObjectStorePort;
use async_trait::async_trait;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::error::Error;
use std::time::Duration;
use tokio::fs::File;
use tracing::{debug, info};

/// S3Adapter implements ObjectStorePort for AWS S3 and S3-compatible services.
#[derive(Clone)]
pub struct S3Adapter {
    client: Client,
}

impl S3Adapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS credential chain and `settings`.
    pub async fn from_settings(settings: &S3Settings) -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.region.clone()))
            .load()
            .await;

        let mut builder = S3ConfigBuilder::from(&aws_config);
        if let Some(endpoint) = &settings.endpoint {
            // MinIO and LocalStack only understand path-style addressing.
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        info!(
            bucket = %settings.bucket,
            region = %settings.region,
            "S3 client initialized"
        );
        Self::new(Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl ObjectStorePort for S3Adapter {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: File,
        content_type: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let byte_stream = ByteStream::read_from().file(body).build().await?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(byte_stream)
            .send()
            .await?;
        debug!(bucket, key, "object uploaded");
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let presigning_config = PresigningConfig::expires_in(ttl)?;
        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning_config)
            .await?;
        Ok(request.uri().to_string())
    }
}
