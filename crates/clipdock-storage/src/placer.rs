use std::path::Path;
use std::sync::Arc;

use crate::keys::generate_asset_key;
use crate::traits::{PlacementResult, RemoteStore};

/// A successfully placed object: its storage key and public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub key: String,
    pub url: String,
}

/// Places local files into a [`RemoteStore`] under freshly generated keys.
#[derive(Clone)]
pub struct AssetPlacer {
    store: Arc<dyn RemoteStore>,
}

impl AssetPlacer {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Uploads the file under a new random key below `prefix` and returns
    /// the key together with its public URL.
    pub async fn place(
        &self,
        local_path: &Path,
        content_type: &str,
        prefix: &str,
    ) -> PlacementResult<StoredAsset> {
        let key = generate_asset_key(prefix);
        self.store.put_file(&key, content_type, local_path).await?;
        let url = self.store.public_url(&key);
        Ok(StoredAsset { key, url })
    }

    pub async fn remove(&self, key: &str) -> PlacementResult<()> {
        self.store.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRemote;
    use crate::traits::PlacementError;
    use tempfile::TempDir;

    fn local_file(dir: &TempDir, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("payload");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn place_uploads_under_prefixed_key() {
        let dir = TempDir::new().unwrap();
        let path = local_file(&dir, b"mp4 bytes");
        let remote = Arc::new(MemoryRemote::new("clips", "us-east-1"));
        let placer = AssetPlacer::new(remote.clone());

        let asset = placer.place(&path, "video/mp4", "landscape").await.unwrap();

        assert!(asset.key.starts_with("landscape/"));
        assert_eq!(
            asset.url,
            format!("https://clips.s3.us-east-1.amazonaws.com/{}", asset.key)
        );
        assert_eq!(remote.object(&asset.key).unwrap(), b"mp4 bytes");
        assert_eq!(remote.content_type(&asset.key).unwrap(), "video/mp4");
    }

    #[tokio::test]
    async fn failed_put_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let path = local_file(&dir, b"bytes");
        let remote = Arc::new(MemoryRemote::new("clips", "us-east-1"));
        remote.fail_puts();
        let placer = AssetPlacer::new(remote.clone());

        let err = placer.place(&path, "video/mp4", "other").await.unwrap_err();

        assert!(matches!(err, PlacementError::UploadFailed(_)));
        assert_eq!(remote.object_count(), 0);
    }

    #[tokio::test]
    async fn remove_deletes_stored_object() {
        let dir = TempDir::new().unwrap();
        let path = local_file(&dir, b"bytes");
        let remote = Arc::new(MemoryRemote::new("clips", "us-east-1"));
        let placer = AssetPlacer::new(remote.clone());

        let asset = placer.place(&path, "image/png", "thumbnails").await.unwrap();
        placer.remove(&asset.key).await.unwrap();

        assert_eq!(remote.object_count(), 0);
        assert!(matches!(
            placer.remove(&asset.key).await.unwrap_err(),
            PlacementError::NotFound(_)
        ));
    }
}
