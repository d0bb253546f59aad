//! In-memory storage for tests
//!
//! Stores objects in a map and lets tests inject write latency, write failures,
//! container probe results and calls that never complete.

use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How `container_exists` answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerProbe {
    /// Answer from the set of known containers
    Known,
    /// Fail the probe, as a client without list permissions would
    Inconclusive,
}

#[derive(Clone)]
pub struct MemoryStorage {
    container: String,
    objects: Arc<Mutex<HashMap<String, (Bytes, String)>>>,
    containers: Arc<Mutex<HashSet<String>>>,
    put_delay: Option<Duration>,
    fail_puts: bool,
    probe: ContainerProbe,
    can_create: bool,
    stall_puts: bool,
    stall_deletes: bool,
    stall_container_checks: bool,
    lost_deletes: Arc<AtomicUsize>,
    put_calls: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn new(container: impl Into<String>) -> Self {
        let container = container.into();
        let mut containers = HashSet::new();
        containers.insert(container.clone());
        Self {
            container,
            objects: Arc::new(Mutex::new(HashMap::new())),
            containers: Arc::new(Mutex::new(containers)),
            put_delay: None,
            fail_puts: false,
            probe: ContainerProbe::Known,
            can_create: true,
            stall_puts: false,
            stall_deletes: false,
            stall_container_checks: false,
            lost_deletes: Arc::new(AtomicUsize::new(0)),
            put_calls: Arc::new(AtomicUsize::new(0)),
            delete_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Start without the destination container
    pub fn without_container(self) -> Self {
        self.containers.lock().unwrap().clear();
        self
    }

    /// Write the object, then sleep before acknowledging
    pub fn with_put_delay(mut self, delay: Duration) -> Self {
        self.put_delay = Some(delay);
        self
    }

    pub fn failing_puts(mut self) -> Self {
        self.fail_puts = true;
        self
    }

    pub fn with_probe(mut self, probe: ContainerProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn without_create_permission(mut self) -> Self {
        self.can_create = false;
        self
    }

    /// `put_object` never completes and writes nothing
    pub fn stalling_puts(mut self) -> Self {
        self.stall_puts = true;
        self
    }

    /// `delete_object` never completes
    pub fn stalling_deletes(mut self) -> Self {
        self.stall_deletes = true;
        self
    }

    /// `container_exists` never completes
    pub fn stalling_container_checks(mut self) -> Self {
        self.stall_container_checks = true;
        self
    }

    /// The next `count` deletes report success without removing anything, as when a
    /// delete reaches the backend before an in-flight write lands
    pub fn losing_deletes(self, count: usize) -> Self {
        self.lost_deletes.store(count, Ordering::SeqCst);
        self
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(data, _)| data.clone())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, ct)| ct.clone())
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn has_container(&self, name: &str) -> bool {
        self.containers.lock().unwrap().contains(name)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn container(&self) -> &str {
        &self.container
    }

    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<String> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        if self.stall_puts {
            std::future::pending::<()>().await;
        }

        if self.fail_puts {
            return Err(StorageError::UploadFailed("simulated backend failure".to_string()));
        }

        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));

        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }

        Ok(key.to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://storage.test/{}/{}", self.container, key)
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if self.stall_deletes {
            std::future::pending::<()>().await;
        }

        let lost = self
            .lost_deletes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !lost {
            self.objects.lock().unwrap().remove(key);
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn container_exists(&self, name: &str) -> StorageResult<bool> {
        if self.stall_container_checks {
            std::future::pending::<()>().await;
        }

        match self.probe {
            ContainerProbe::Known => Ok(self.has_container(name)),
            ContainerProbe::Inconclusive => Err(StorageError::BackendError(
                "permission denied listing containers".to_string(),
            )),
        }
    }

    async fn create_container(&self, name: &str) -> StorageResult<bool> {
        if !self.can_create {
            return Err(StorageError::BackendError(
                "permission denied creating container".to_string(),
            ));
        }
        self.containers.lock().unwrap().insert(name.to_string());
        Ok(true)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
