use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::s3::object_url;
use crate::traits::{PlacementError, PlacementResult, RemoteStore};

struct StoredObject {
    content_type: String,
    bytes: Vec<u8>,
}

/// In-memory [`RemoteStore`] for tests. Mirrors the AWS URL shape of
/// [`crate::S3Remote`] so assertions on stored URLs carry over, and records
/// the content type each object was submitted with.
pub struct MemoryRemote {
    bucket: String,
    region: String,
    objects: Mutex<HashMap<String, StoredObject>>,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryRemote {
    pub fn new(bucket: &str, region: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            region: region.to_string(),
            objects: Mutex::new(HashMap::new()),
            fail_puts: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn has_object(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|object| object.bytes.clone())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|object| object.content_type.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn put_file(
        &self,
        key: &str,
        content_type: &str,
        local_path: &Path,
    ) -> PlacementResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(PlacementError::UploadFailed(
                "forced upload failure".to_string(),
            ));
        }
        let bytes = tokio::fs::read(local_path).await?;
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> PlacementResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(PlacementError::DeleteFailed(
                "forced delete failure".to_string(),
            ));
        }
        match self.objects.lock().unwrap().remove(key) {
            Some(_) => Ok(()),
            None => Err(PlacementError::NotFound(key.to_string())),
        }
    }

    fn public_url(&self, key: &str) -> String {
        object_url(None, &self.bucket, &self.region, key)
    }
}
