//! S3-compatible object store (AWS S3 or MinIO).
//!
//! Uploads are streamed in fixed-size parts so memory stays bounded by
//! [`defaults::MULTIPART_PART_BYTES`] whatever the object size. Objects
//! that fit in a single part go through a plain `PutObject`.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, trace, warn};

use docvault_core::env::{self, Lookup};
use docvault_core::{defaults, Error, ObjectStore, Result};

/// Connection settings for an S3-compatible endpoint.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Custom endpoint (MinIO). `None` uses the AWS default resolver.
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub bucket: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: defaults::S3_REGION.to_string(),
            access_key: None,
            secret_key: None,
            bucket: defaults::BUCKET.to_string(),
        }
    }
}

impl S3Config {
    /// Read `S3_ENDPOINT`, `S3_REGION`, `S3_ACCESS_KEY`, `S3_SECRET_KEY` and
    /// `S3_BUCKET` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(&env::process)
    }

    /// Same as [`S3Config::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let base = Self::default();
        Self {
            endpoint: env::var(lookup, defaults::ENV_S3_ENDPOINT),
            region: env::var(lookup, defaults::ENV_S3_REGION).unwrap_or(base.region),
            access_key: env::var(lookup, defaults::ENV_S3_ACCESS_KEY),
            secret_key: env::var(lookup, defaults::ENV_S3_SECRET_KEY),
            bucket: env::var(lookup, defaults::ENV_S3_BUCKET).unwrap_or(base.bucket),
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    part_size: usize,
}

fn storage_err<E: std::error::Error>(op: &str, err: E) -> Error {
    Error::Storage(format!("{}: {}", op, DisplayErrorContext(err)))
}

/// Fill a buffer of up to `limit` bytes, stopping early only at EOF.
async fn read_part(
    reader: &mut (dyn AsyncRead + Send + Unpin),
    limit: usize,
) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(limit);
    AsyncReadExt::take(&mut *reader, limit as u64)
        .read_to_end(&mut buf)
        .await?;
    Ok(buf)
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            part_size: defaults::MULTIPART_PART_BYTES,
        }
    }

    /// Build a client from explicit settings. MinIO endpoints use
    /// path-style addressing.
    pub async fn connect(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let (Some(access), Some(secret)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access.clone(),
                secret.clone(),
                None,
                None,
                "docvault",
            ));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        info!(
            subsystem = "storage",
            component = "s3",
            op = "connect",
            bucket = %config.bucket,
            endpoint = config.endpoint.as_deref().unwrap_or("(aws)"),
            "Object store client configured"
        );
        Self::new(
            aws_sdk_s3::Client::from_conf(builder.build()),
            config.bucket.clone(),
        )
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_multipart(
        &self,
        key: &str,
        first_part: Vec<u8>,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        content_type: &str,
    ) -> Result<u64> {
        let upload = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| storage_err("create multipart upload", e))?;
        let upload_id = upload
            .upload_id()
            .ok_or_else(|| Error::Storage("multipart upload returned no upload id".into()))?
            .to_string();

        match self.upload_parts(key, &upload_id, first_part, reader).await {
            Ok((parts, written)) => {
                self.client
                    .complete_multipart_upload()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    )
                    .send()
                    .await
                    .map_err(|e| storage_err("complete multipart upload", e))?;
                Ok(written)
            }
            Err(err) => {
                if let Err(abort_err) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    warn!(
                        subsystem = "storage",
                        component = "s3",
                        op = "abort_multipart",
                        object_key = key,
                        error = %DisplayErrorContext(abort_err),
                        "Failed to abort multipart upload"
                    );
                }
                Err(err)
            }
        }
    }

    async fn upload_parts(
        &self,
        key: &str,
        upload_id: &str,
        first_part: Vec<u8>,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<(Vec<CompletedPart>, u64)> {
        let mut parts = Vec::new();
        let mut written = 0u64;
        let mut chunk = first_part;
        let mut part_number = 1i32;

        while !chunk.is_empty() {
            let len = chunk.len();
            let out = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(chunk))
                .send()
                .await
                .map_err(|e| storage_err("upload part", e))?;

            trace!(
                subsystem = "storage",
                component = "s3",
                object_key = key,
                part_number,
                byte_count = len,
                "Uploaded part"
            );

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(out.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );
            written += len as u64;
            part_number += 1;
            chunk = read_part(reader, self.part_size).await?;
        }

        Ok((parts, written))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        size: u64,
        content_type: &str,
    ) -> Result<u64> {
        let start = Instant::now();
        let first = read_part(reader, self.part_size).await?;

        let written = if first.len() < self.part_size {
            let len = first.len() as u64;
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .content_type(content_type)
                .body(ByteStream::from(first))
                .send()
                .await
                .map_err(|e| storage_err("put object", e))?;
            len
        } else {
            self.put_multipart(key, first, reader, content_type).await?
        };

        debug!(
            subsystem = "storage",
            component = "s3",
            op = "put",
            object_key = key,
            declared_size = size,
            byte_count = written,
            duration_ms = start.elapsed().as_millis() as u64,
            "Stored object"
        );
        Ok(written)
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| storage_err("get object", e))?;
        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| storage_err("read object body", e))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| storage_err("delete object", e))?;
        Ok(())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String> {
        let presigning =
            PresigningConfig::expires_in(ttl).map_err(|e| storage_err("presigning config", e))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| storage_err("presign get", e))?;
        Ok(presigned.uri().to_string())
    }

    async fn ensure_bucket(&self) -> Result<()> {
        if self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
        {
            return Ok(());
        }
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| storage_err("create bucket", e))?;
        info!(
            subsystem = "storage",
            component = "s3",
            op = "ensure_bucket",
            bucket = %self.bucket,
            "Created bucket"
        );
        Ok(())
    }
}
