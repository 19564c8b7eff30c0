//! AWS S3 storage backend.
//!
//! Images are written to a single S3 bucket under the key produced by
//! [`super::object_key`], which already carries the configured prefix.
//!
//! Credentials come from the configuration when both halves are set,
//! otherwise from the standard AWS credential chain
//! (env vars, `~/.aws/credentials`, IAM role, etc.).

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info};

use super::backend::{compute_etag, stored_object, StorageBackend, StoredObject};
use super::content_type_for;
use crate::config::AwsStorageConfig;

/// Backend that stores images in an AWS S3 (or S3-compatible) bucket.
pub struct AwsGatewayBackend {
    /// AWS S3 SDK client.
    client: Client,
    /// Target bucket.
    bucket: String,
}

impl AwsGatewayBackend {
    /// Build the S3 client from configuration.
    ///
    /// An empty `endpoint_url` means the regional AWS endpoint.
    pub async fn new(config: &AwsStorageConfig) -> anyhow::Result<Self> {
        if config.bucket.is_empty() {
            anyhow::bail!("storage.aws.bucket must be set for the aws backend");
        }

        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if !config.endpoint_url.is_empty() {
            config_loader = config_loader.endpoint_url(&config.endpoint_url);
        }

        if !config.access_key_id.is_empty() && !config.secret_access_key.is_empty() {
            let creds = aws_sdk_s3::config::Credentials::new(
                &config.access_key_id,
                &config.secret_access_key,
                None, // session_token
                None, // expiry
                "gearshift-config",
            );
            config_loader = config_loader.credentials_provider(creds);
        }

        let sdk_config = config_loader.load().await;

        let s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.use_path_style);

        let client = Client::from_conf(s3_config_builder.build());

        info!(
            "AWS S3 backend initialized: bucket={} region={}",
            config.bucket, config.region
        );

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
        })
    }

    /// Map an AWS SDK error to an anyhow error with context.
    fn map_sdk_error(context: &str, err: impl std::fmt::Display) -> anyhow::Error {
        anyhow::anyhow!("AWS S3 {context}: {err}")
    }
}

impl StorageBackend for AwsGatewayBackend {
    fn put(
        &self,
        storage_key: &str,
        data: Bytes,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        let storage_key = storage_key.to_string();
        Box::pin(async move {
            // Computed locally; S3 may return a different ETag under SSE-KMS.
            let etag = compute_etag(&data);

            debug!("AWS put_object: bucket={} key={}", self.bucket, storage_key);

            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(&storage_key)
                .content_type(content_type_for(&storage_key))
                .body(ByteStream::from(data))
                .send()
                .await
                .map_err(|e| Self::map_sdk_error("put_object", e.into_service_error()))?;

            Ok(etag)
        })
    }

    fn get(
        &self,
        storage_key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<StoredObject>>> + Send + '_>> {
        let storage_key = storage_key.to_string();
        Box::pin(async move {
            debug!("AWS get_object: bucket={} key={}", self.bucket, storage_key);

            let resp = match self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(&storage_key)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    let service_err = e.into_service_error();
                    if service_err.is_no_such_key() {
                        return Ok(None);
                    }
                    return Err(Self::map_sdk_error("get_object", service_err));
                }
            };

            let body_bytes = resp
                .body
                .collect()
                .await
                .map_err(|e| Self::map_sdk_error("get_object body", e))?
                .into_bytes();

            Ok(Some(stored_object(body_bytes)))
        })
    }

    fn delete(
        &self,
        storage_key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        let storage_key = storage_key.to_string();
        Box::pin(async move {
            debug!("AWS delete_object: bucket={} key={}", self.bucket, storage_key);

            // S3 delete_object is idempotent -- no error for missing keys.
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(&storage_key)
                .send()
                .await
                .map_err(|e| Self::map_sdk_error("delete_object", e.into_service_error()))?;

            Ok(())
        })
    }
}
