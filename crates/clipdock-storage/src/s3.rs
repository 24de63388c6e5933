use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::Error as ObjectStoreError;
use object_store::{MultipartUpload, ObjectStoreExt, PutPayload};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::traits::{PlacementError, PlacementResult, RemoteStore};

/// Minimum part size accepted by S3 multipart uploads (5 MB).
const MIN_PART_SIZE: usize = 5 * 1024 * 1024;
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// [`RemoteStore`] over an S3 bucket (or an S3-compatible provider when
/// `endpoint_url` is set). Credentials come from the environment via
/// [`AmazonS3Builder::from_env`].
#[derive(Clone)]
pub struct S3Remote {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl S3Remote {
    pub fn new(bucket: &str, region: &str, endpoint_url: Option<&str>) -> PlacementResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket);

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| PlacementError::Config(e.to_string()))?;

        Ok(Self {
            store,
            bucket: bucket.to_string(),
            region: region.to_string(),
            endpoint_url: endpoint_url.map(str::to_string),
        })
    }
}

#[async_trait]
impl RemoteStore for S3Remote {
    /// Streams the file in 5 MB parts so large uploads never sit in memory
    /// whole. A failed part aborts the multipart upload before returning.
    /// The served content type is left to bucket configuration.
    #[tracing::instrument(
        skip(self, _content_type),
        fields(storage.bucket = %self.bucket, storage.key = key)
    )]
    async fn put_file(
        &self,
        key: &str,
        _content_type: &str,
        local_path: &Path,
    ) -> PlacementResult<()> {
        let mut file = File::open(local_path).await?;
        let location = ObjectPath::from(key);
        let start = Instant::now();

        let mut upload = self
            .store
            .put_multipart(&location)
            .await
            .map_err(|e| PlacementError::UploadFailed(e.to_string()))?;

        let mut part = Vec::with_capacity(MIN_PART_SIZE);
        let mut chunk = vec![0u8; READ_BUFFER_SIZE];
        let mut total_bytes: u64 = 0;
        loop {
            let n = match file.read(&mut chunk).await {
                Ok(n) => n,
                Err(e) => {
                    upload.abort().await.ok();
                    return Err(PlacementError::Io(e));
                }
            };
            if n == 0 {
                break;
            }
            total_bytes += n as u64;
            part.extend_from_slice(&chunk[..n]);
            if part.len() >= MIN_PART_SIZE {
                let data = std::mem::replace(&mut part, Vec::with_capacity(MIN_PART_SIZE));
                if let Err(e) = upload.put_part(PutPayload::from(data)).await {
                    upload.abort().await.ok();
                    return Err(PlacementError::UploadFailed(e.to_string()));
                }
            }
        }

        // The final part may be any size; an empty upload still needs one
        // part for complete() to succeed.
        if !part.is_empty() || total_bytes == 0 {
            let data = std::mem::take(&mut part);
            if let Err(e) = upload.put_part(PutPayload::from(data)).await {
                upload.abort().await.ok();
                return Err(PlacementError::UploadFailed(e.to_string()));
            }
        }

        upload
            .complete()
            .await
            .map_err(|e| PlacementError::UploadFailed(e.to_string()))?;

        tracing::info!(
            size_bytes = total_bytes,
            duration_ms = start.elapsed().as_millis() as u64,
            "uploaded object"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(storage.bucket = %self.bucket, storage.key = key))]
    async fn delete(&self, key: &str) -> PlacementResult<()> {
        let location = ObjectPath::from(key);
        match self.store.delete(&location).await {
            Ok(()) => Ok(()),
            Err(ObjectStoreError::NotFound { .. }) => {
                Err(PlacementError::NotFound(key.to_string()))
            }
            Err(e) => Err(PlacementError::DeleteFailed(e.to_string())),
        }
    }

    fn public_url(&self, key: &str) -> String {
        object_url(
            self.endpoint_url.as_deref(),
            &self.bucket,
            &self.region,
            key,
        )
    }
}

/// Public URL for an object. AWS buckets use the virtual-hosted-style URL;
/// custom endpoints use path-style for compatibility across providers.
pub(crate) fn object_url(endpoint: Option<&str>, bucket: &str, region: &str, key: &str) -> String {
    match endpoint {
        Some(endpoint) => {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, bucket, key)
        }
        None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
    }
}
