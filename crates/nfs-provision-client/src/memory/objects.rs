use super::{lock, ENOENT};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nfs_provision_core::{IoCtx, ObjectStat, ObjectStore, ProvisionError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type ObjectKey = (Option<String>, String);

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    modified: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreState {
    pools: HashMap<String, HashMap<ObjectKey, StoredObject>>,
    write_failure: Option<(i32, String)>,
    stat_failure: Option<(i32, String)>,
    stall_stats: bool,
}

#[derive(Debug, Default)]
struct Counters {
    open: AtomicUsize,
    opened: AtomicUsize,
    writes: AtomicUsize,
}

fn normalize(namespace: Option<&str>) -> Option<String> {
    namespace.filter(|ns| !ns.is_empty()).map(str::to_string)
}

/// In-memory object store with pools and namespaces
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    state: Arc<Mutex<StoreState>>,
    counters: Arc<Counters>,
}

impl MemoryObjectStore {
    /// Create a store with no pools
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool; existing pools are left as they are
    pub fn create_pool(&self, pool: &str) {
        lock(&self.state).pools.entry(pool.to_string()).or_default();
    }

    /// Store an object directly, creating the pool if needed
    pub fn put(&self, pool: &str, namespace: Option<&str>, name: &str, data: &[u8]) {
        lock(&self.state)
            .pools
            .entry(pool.to_string())
            .or_default()
            .insert(
                (normalize(namespace), name.to_string()),
                StoredObject {
                    data: data.to_vec(),
                    modified: Utc::now(),
                },
            );
    }

    /// Read an object directly
    pub fn get(&self, pool: &str, namespace: Option<&str>, name: &str) -> Option<Vec<u8>> {
        lock(&self.state)
            .pools
            .get(pool)?
            .get(&(normalize(namespace), name.to_string()))
            .map(|obj| obj.data.clone())
    }

    /// Make every subsequent `write_full` fail with `code`
    pub fn fail_writes(&self, code: i32, message: impl Into<String>) {
        lock(&self.state).write_failure = Some((code, message.into()));
    }

    /// Make every subsequent `stat` fail with `code`
    pub fn fail_stats(&self, code: i32, message: impl Into<String>) {
        lock(&self.state).stat_failure = Some((code, message.into()));
    }

    /// Make `stat` wait forever while set
    pub fn stall_stats(&self, stall: bool) {
        lock(&self.state).stall_stats = stall;
    }

    /// Handles currently open
    pub fn open_handles(&self) -> usize {
        self.counters.open.load(Ordering::SeqCst)
    }

    /// Handles opened over the store's lifetime
    pub fn opened_total(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Successful writes over the store's lifetime
    pub fn write_count(&self) -> usize {
        self.counters.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    type Handle = MemoryIoCtx;

    async fn open_ioctx(&self, pool: &str, namespace: Option<&str>) -> Result<MemoryIoCtx> {
        if !lock(&self.state).pools.contains_key(pool) {
            return Err(ProvisionError::object_store(
                ENOENT,
                format!("pool '{pool}' does not exist"),
            ));
        }

        self.counters.open.fetch_add(1, Ordering::SeqCst);
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryIoCtx {
            state: Arc::clone(&self.state),
            counters: Arc::clone(&self.counters),
            pool: pool.to_string(),
            namespace: normalize(namespace),
        })
    }
}

/// Handle on one pool/namespace of a [`MemoryObjectStore`]
///
/// Dropping the handle releases it.
#[derive(Debug)]
pub struct MemoryIoCtx {
    state: Arc<Mutex<StoreState>>,
    counters: Arc<Counters>,
    pool: String,
    namespace: Option<String>,
}

impl MemoryIoCtx {
    fn key(&self, name: &str) -> ObjectKey {
        (self.namespace.clone(), name.to_string())
    }

    fn not_found(name: &str) -> ProvisionError {
        ProvisionError::NotFound {
            object: name.to_string(),
        }
    }

    fn pool_gone(&self) -> ProvisionError {
        ProvisionError::object_store(ENOENT, format!("pool '{}' does not exist", self.pool))
    }
}

impl Drop for MemoryIoCtx {
    fn drop(&mut self) {
        self.counters.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl IoCtx for MemoryIoCtx {
    async fn stat(&self, name: &str) -> Result<ObjectStat> {
        let stalled = {
            let state = lock(&self.state);
            if let Some((code, message)) = &state.stat_failure {
                return Err(ProvisionError::object_store(*code, message.clone()));
            }
            state.stall_stats
        };
        if stalled {
            std::future::pending::<()>().await;
        }

        let state = lock(&self.state);
        let pool = state.pools.get(&self.pool).ok_or_else(|| self.pool_gone())?;
        pool.get(&self.key(name))
            .map(|obj| ObjectStat {
                size: obj.data.len() as u64,
                modified: obj.modified,
            })
            .ok_or_else(|| Self::not_found(name))
    }

    async fn write_full(&self, name: &str, data: &[u8]) -> Result<()> {
        let mut state = lock(&self.state);
        if let Some((code, message)) = &state.write_failure {
            return Err(ProvisionError::object_store(*code, message.clone()));
        }
        let key = self.key(name);
        let pool = state
            .pools
            .get_mut(&self.pool)
            .ok_or_else(|| self.pool_gone())?;
        pool.insert(
            key,
            StoredObject {
                data: data.to_vec(),
                modified: Utc::now(),
            },
        );
        self.counters.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>> {
        let state = lock(&self.state);
        let pool = state.pools.get(&self.pool).ok_or_else(|| self.pool_gone())?;
        pool.get(&self.key(name))
            .map(|obj| obj.data.clone())
            .ok_or_else(|| Self::not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let store = MemoryObjectStore::new();
        store.create_pool("pool");
        store.put("pool", Some("a"), "obj", b"in a");

        let a = store.open_ioctx("pool", Some("a")).await.unwrap();
        let b = store.open_ioctx("pool", Some("b")).await.unwrap();

        assert_eq!(a.read("obj").await.unwrap(), b"in a");
        assert!(b.stat("obj").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn empty_namespace_is_default_namespace() {
        let store = MemoryObjectStore::new();
        store.put("pool", None, "obj", b"x");

        let ioctx = store.open_ioctx("pool", Some("")).await.unwrap();
        assert_eq!(ioctx.stat("obj").await.unwrap().size, 1);
    }

    #[tokio::test]
    async fn dropping_handle_releases_it() {
        let store = MemoryObjectStore::new();
        store.create_pool("pool");

        let first = store.open_ioctx("pool", None).await.unwrap();
        let second = store.open_ioctx("pool", None).await.unwrap();
        assert_eq!(store.open_handles(), 2);

        drop(first);
        assert_eq!(store.open_handles(), 1);
        drop(second);
        assert_eq!(store.open_handles(), 0);
        assert_eq!(store.opened_total(), 2);
    }

    #[tokio::test]
    async fn write_full_replaces_body() {
        let store = MemoryObjectStore::new();
        store.put("pool", None, "obj", b"long old body");

        let ioctx = store.open_ioctx("pool", None).await.unwrap();
        ioctx.write_full("obj", b"new").await.unwrap();

        assert_eq!(store.get("pool", None, "obj"), Some(b"new".to_vec()));
        assert_eq!(store.write_count(), 1);
    }
}
