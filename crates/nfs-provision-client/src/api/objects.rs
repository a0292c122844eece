//! The configuration object gateways watch.

use nfs_provision_core::{ConfigObject, ConfigObjectOutcome, IoCtx, ObjectStore, Result};
use tracing::info;

/// Materializes configuration objects without clobbering operator edits
#[derive(Debug, Clone)]
pub struct ConfigObjectStore<S> {
    store: S,
}

impl<S: ObjectStore> ConfigObjectStore<S> {
    /// Create a config object store over an object store
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying object store
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Make sure the configuration object `name` exists.
    ///
    /// An existing object is left alone unless `clobber` is set, in which
    /// case it is replaced by the initial (empty) body.
    pub async fn ensure_config_object(
        &self,
        name: &str,
        pool: &str,
        namespace: Option<&str>,
        clobber: bool,
    ) -> Result<ConfigObjectOutcome> {
        let object = ConfigObject {
            name: name.to_string(),
            pool: pool.to_string(),
            namespace: namespace.map(str::to_string),
            content: Vec::new(),
        };
        self.ensure(&object, clobber).await
    }

    /// Make sure `object` exists, writing its content when it is absent or
    /// when `clobber` is set.
    ///
    /// The stat and the write are not atomic: two concurrent calls for the
    /// same object may both see it missing and both write. Callers must
    /// serialize provisioning per service.
    pub async fn ensure(&self, object: &ConfigObject, clobber: bool) -> Result<ConfigObjectOutcome> {
        let name = object.name.as_str();
        let namespace = object.namespace.as_deref();
        let ioctx = self.store.open_ioctx(&object.pool, namespace).await?;

        let exists = match ioctx.stat(name).await {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => return Err(e),
        };

        if exists && !clobber {
            info!(object = name, "Config object exists");
            return Ok(ConfigObjectOutcome::Preserved);
        }

        info!(object = name, pool = %object.pool, namespace, "Creating config object");
        ioctx.write_full(name, &object.content).await?;

        Ok(if exists {
            ConfigObjectOutcome::Overwritten
        } else {
            ConfigObjectOutcome::Created
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryObjectStore;
    use nfs_provision_core::{ProvisionError, ServiceSpec};
    use std::sync::Arc;
    use std::time::Duration;

    const OBJ: &str = "conf-nfs.foo";

    fn setup() -> (Arc<MemoryObjectStore>, ConfigObjectStore<Arc<MemoryObjectStore>>) {
        let store = Arc::new(MemoryObjectStore::new());
        store.create_pool("nfs-ganesha");
        (Arc::clone(&store), ConfigObjectStore::new(store))
    }

    #[tokio::test]
    async fn creates_missing_object() {
        let (store, objects) = setup();

        let outcome = objects
            .ensure_config_object(OBJ, "nfs-ganesha", Some("export1"), false)
            .await
            .unwrap();

        assert_eq!(outcome, ConfigObjectOutcome::Created);
        assert_eq!(store.get("nfs-ganesha", Some("export1"), OBJ), Some(Vec::new()));
        assert_eq!(store.get("nfs-ganesha", None, OBJ), None);
    }

    #[tokio::test]
    async fn preserves_custom_content() {
        let (store, objects) = setup();
        store.put("nfs-ganesha", Some("export1"), OBJ, b"CUSTOM");

        for _ in 0..3 {
            let outcome = objects
                .ensure_config_object(OBJ, "nfs-ganesha", Some("export1"), false)
                .await
                .unwrap();
            assert_eq!(outcome, ConfigObjectOutcome::Preserved);
        }

        assert_eq!(
            store.get("nfs-ganesha", Some("export1"), OBJ),
            Some(b"CUSTOM".to_vec())
        );
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn clobber_replaces_content() {
        let (store, objects) = setup();
        store.put("nfs-ganesha", None, OBJ, b"CUSTOM");

        let outcome = objects
            .ensure_config_object(OBJ, "nfs-ganesha", None, true)
            .await
            .unwrap();

        assert_eq!(outcome, ConfigObjectOutcome::Overwritten);
        assert_eq!(store.get("nfs-ganesha", None, OBJ), Some(Vec::new()));
    }

    #[tokio::test]
    async fn clobber_on_missing_object_creates() {
        let (_, objects) = setup();

        let outcome = objects
            .ensure_config_object(OBJ, "nfs-ganesha", None, true)
            .await
            .unwrap();

        assert_eq!(outcome, ConfigObjectOutcome::Created);
    }

    #[tokio::test]
    async fn missing_pool_is_object_store_error() {
        let (store, objects) = setup();

        let err = objects
            .ensure_config_object(OBJ, "no-such-pool", None, false)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::ObjectStore { code: -2, .. }));
        assert_eq!(store.open_handles(), 0);
    }

    #[tokio::test]
    async fn handle_released_after_write_failure() {
        let (store, objects) = setup();
        store.fail_writes(-28, "no space left on device");

        let err = objects
            .ensure_config_object(OBJ, "nfs-ganesha", None, false)
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(-28));
        assert_eq!(store.open_handles(), 0);
    }

    #[tokio::test]
    async fn handle_released_after_success() {
        let (store, objects) = setup();

        objects
            .ensure_config_object(OBJ, "nfs-ganesha", None, false)
            .await
            .unwrap();

        assert_eq!(store.open_handles(), 0);
        assert_eq!(store.opened_total(), 1);
    }

    #[tokio::test]
    async fn ensure_writes_model_content() {
        let (store, objects) = setup();
        let mut object = ConfigObject::for_service(&ServiceSpec::nfs("foo", "nfs-ganesha"));
        object.content = b"%include base.conf\n".to_vec();

        let outcome = objects.ensure(&object, false).await.unwrap();

        assert_eq!(outcome, ConfigObjectOutcome::Created);
        assert_eq!(
            store.get("nfs-ganesha", None, OBJ),
            Some(b"%include base.conf\n".to_vec())
        );
    }

    #[tokio::test]
    async fn stat_failure_is_surfaced_without_writing() {
        let (store, objects) = setup();
        store.fail_stats(-5, "eio");

        let err = objects
            .ensure_config_object(OBJ, "nfs-ganesha", None, false)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::ObjectStore { code: -5, .. }));
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.get("nfs-ganesha", None, OBJ), None);
        assert_eq!(store.open_handles(), 0);
    }

    #[tokio::test]
    async fn cancelled_call_releases_handle() {
        let (store, objects) = setup();
        store.stall_stats(true);

        let call = objects.ensure_config_object(OBJ, "nfs-ganesha", None, false);
        let timed_out = tokio::time::timeout(Duration::from_millis(20), call).await;

        assert!(timed_out.is_err());
        assert_eq!(store.opened_total(), 1);
        assert_eq!(store.open_handles(), 0);
        assert_eq!(store.write_count(), 0);
    }
}
