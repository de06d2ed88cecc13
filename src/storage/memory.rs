//! In-memory object store
//!
//! Dev/test backend. Objects live in a mutex-guarded map for the
//! lifetime of the process; URLs are generated the same way as the
//! S3 backend so the rest of the system cannot tell them apart.

use std::collections::HashMap;
use std::sync::Mutex;

use super::ObjectStore;
use crate::error::AppError;

struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    public_url: String,
}

impl MemoryObjectStore {
    pub fn new(public_url: &str) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Number of stored objects (test observability)
    pub fn len(&self) -> usize {
        self.objects.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a key currently holds an object
    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .lock()
            .expect("store mutex poisoned")
            .contains_key(key)
    }

    /// Stored bytes for a key, if present
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("store mutex poisoned")
            .get(key)
            .map(|o| o.data.clone())
    }

    /// Content type recorded for a key, if present
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .expect("store mutex poisoned")
            .get(key)
            .map(|o| o.content_type.clone())
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        self.objects.lock().expect("store mutex poisoned").insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );

        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.objects
            .lock()
            .expect("store mutex poisoned")
            .remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}
