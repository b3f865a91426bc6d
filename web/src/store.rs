use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value snapshot persistence. Values are opaque JSON blobs; each `put`
/// replaces the key atomically. The coordinator is the only writer for any
/// given room key.
pub trait SnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;
    fn put(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
    fn list_with_prefix(&self, prefix: &str) -> Result<Vec<serde_json::Value>, StoreError>;
}

/// In-memory store backing a single-process deployment (and the tests).
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let guard = self
            .entries
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn put(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        guard.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        guard.remove(key);
        Ok(())
    }

    fn list_with_prefix(&self, prefix: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        let guard = self
            .entries
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        Ok(guard
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v.clone())
            .collect())
    }
}

/// Store wrapper whose writes can be switched off, for exercising the
/// degraded-room path.
pub struct FailingStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key)
    }

    fn list_with_prefix(&self, prefix: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        self.inner.list_with_prefix(prefix)
    }
}
