use std::io;
use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use clipdock_core::AppError;

#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("delete failed: {0}")]
    DeleteFailed(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type PlacementResult<T> = Result<T, PlacementError>;

impl From<PlacementError> for AppError {
    fn from(err: PlacementError) -> Self {
        AppError::Placement(err.to_string())
    }
}

/// Object storage backend. The production implementation is [`crate::S3Remote`];
/// tests use [`crate::MemoryRemote`].
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Streams the file at `local_path` to the backend under `key` with the
    /// given content type.
    async fn put_file(&self, key: &str, content_type: &str, local_path: &Path)
        -> PlacementResult<()>;

    async fn delete(&self, key: &str) -> PlacementResult<()>;

    /// Public URL of the object stored under `key`.
    fn public_url(&self, key: &str) -> String;
}
