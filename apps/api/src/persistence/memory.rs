//! In-process store doubles used by unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::profile::{ProfileDocument, ProfilePatch};
use crate::persistence::device::{DeviceStore, DeviceStoreError};
use crate::persistence::{ProfileStore, StoreError};

#[derive(Default)]
pub struct InMemoryProfileStore {
    documents: Mutex<HashMap<String, ProfileDocument>>,
    merges: AtomicUsize,
    deny: bool,
    slow: bool,
}

impl InMemoryProfileStore {
    /// A store that rejects every call the way a locked-down database would.
    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Default::default()
        }
    }

    /// Yields to the scheduler before every call so concurrent callers
    /// interleave the way they do against a remote database.
    pub fn slow() -> Self {
        Self {
            slow: true,
            ..Default::default()
        }
    }

    async fn io(&self) -> Result<(), StoreError> {
        if self.slow {
            tokio::task::yield_now().await;
        }
        if self.deny {
            return Err(StoreError::PermissionDenied);
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<ProfileDocument> {
        self.documents.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: &str, document: ProfileDocument) {
        self.documents
            .lock()
            .unwrap()
            .insert(key.to_string(), document);
    }

    pub fn merge_count(&self) -> usize {
        self.merges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch(&self, key: &str) -> Result<Option<ProfileDocument>, StoreError> {
        self.io().await?;
        Ok(self.get(key))
    }

    async fn create(&self, key: &str, document: &ProfileDocument) -> Result<(), StoreError> {
        self.io().await?;
        self.put(key, document.clone());
        Ok(())
    }

    async fn merge(
        &self,
        key: &str,
        patch: &ProfilePatch,
        last_active: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.io().await?;
        let mut documents = self.documents.lock().unwrap();
        let document = documents
            .entry(key.to_string())
            .or_insert_with(|| ProfileDocument {
                roadmap: Vec::new(),
                daily_tasks: Vec::new(),
                homework_tasks: Vec::new(),
                lingua_session: None,
                last_active,
                last_reset_date: None,
            });
        patch.clone().apply_to(document);
        document.last_active = last_active;
        self.merges.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MemoryDeviceStore {
    values: Mutex<HashMap<String, String>>,
    max_value_bytes: usize,
}

impl MemoryDeviceStore {
    pub fn with_limit(max_value_bytes: usize) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            max_value_bytes,
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

impl Default for MemoryDeviceStore {
    fn default() -> Self {
        Self::with_limit(64 * 1024)
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DeviceStoreError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DeviceStoreError> {
        if value.len() > self.max_value_bytes {
            return Err(DeviceStoreError::QuotaExceeded {
                size: value.len(),
                limit: self.max_value_bytes,
            });
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        _ttl: Duration,
    ) -> Result<(), DeviceStoreError> {
        self.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), DeviceStoreError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}
