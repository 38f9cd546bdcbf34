//! In-memory object store

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tubely_storage::{CanonicalUrls, ObjectLocation, Storage, StorageError, StorageResult};

use super::CallLog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// Mock storage keeping objects in a map, with switchable put failures.
#[derive(Clone)]
pub struct MockStorage {
    urls: CanonicalUrls,
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    puts: Arc<AtomicUsize>,
    fail_puts: Arc<AtomicBool>,
    log: CallLog,
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStorage {
    pub const BUCKET: &'static str = "tubely-test";
    pub const REGION: &'static str = "us-east-1";

    pub fn new() -> Self {
        Self {
            urls: CanonicalUrls::virtual_hosted(Self::BUCKET, Self::REGION),
            objects: Arc::new(Mutex::new(HashMap::new())),
            puts: Arc::new(AtomicUsize::new(0)),
            fail_puts: Arc::new(AtomicBool::new(false)),
            log: CallLog::new(),
        }
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    /// Make every following put fail as if the network dropped.
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Successful puts so far, counting overwrites of an existing key.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn canonical_url(&self, key: &str) -> String {
        self.urls.url_for(key)
    }

    fn store(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<String> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(
                "simulated network error".to_string(),
            ));
        }
        tubely_storage::keys::validate_key(key)?;

        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.log.record(format!("put:{}", key));
        Ok(self.urls.url_for(key))
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put_file(
        &self,
        storage_key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<String> {
        let data = tokio::fs::read(path).await?;
        self.store(storage_key, Bytes::from(data), content_type)
    }

    async fn put_bytes(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String> {
        self.store(storage_key, data, content_type)
    }

    fn locate(&self, canonical_url: &str) -> StorageResult<ObjectLocation> {
        self.urls.parse(canonical_url)
    }

    async fn presigned_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!(
            "{}?X-Amz-Expires={}&X-Amz-Signature=mock",
            self.urls.url_for(storage_key),
            expires_in.as_secs()
        ))
    }

    fn bucket(&self) -> &str {
        self.urls.bucket()
    }
}
