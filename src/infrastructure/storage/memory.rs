use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{BlobStore, StorageError, Visibility};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
    pub visibility: Visibility,
}

/// In-memory store that records every call it receives.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    failing_puts: Mutex<HashSet<String>>,
    gets: Mutex<Vec<String>>,
    puts: Mutex<Vec<String>>,
}

impl MemoryBlobStore {
    pub fn with_object(key: &str, body: impl Into<Bytes>) -> Self {
        let store = Self::default();
        store.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body: body.into(),
                content_type: "application/octet-stream".to_string(),
                visibility: Visibility::PublicRead,
            },
        );
        store
    }

    pub fn fail_put_for(&self, key: &str) {
        self.failing_puts.lock().unwrap().insert(key.to_string());
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    pub fn put_calls(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        self.gets.lock().unwrap().push(key.to_string());
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|o| o.body.clone())
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })
    }

    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError> {
        self.puts.lock().unwrap().push(key.to_string());
        if self.failing_puts.lock().unwrap().contains(key) {
            return Err(StorageError::backend("simulated upload failure"));
        }
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                visibility,
            },
        );
        Ok(())
    }
}
