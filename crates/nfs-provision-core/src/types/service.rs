use crate::error::{ProvisionError, Result};
use serde::{Deserialize, Serialize};

/// Service type used for NFS gateway daemons
pub const NFS_SERVICE_TYPE: &str = "nfs";

/// Logical NFS service and the storage partition backing it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Pool holding the configuration object
    pub pool: String,

    /// Namespace within the pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Service type (e.g. `nfs`)
    pub service_type: String,

    /// Full service name (e.g. `nfs.foo`)
    pub service_name: String,
}

impl ServiceSpec {
    /// Create a spec from explicit parts
    pub fn new(
        service_type: impl Into<String>,
        service_name: impl Into<String>,
        pool: impl Into<String>,
    ) -> Self {
        Self {
            pool: pool.into(),
            namespace: None,
            service_type: service_type.into(),
            service_name: service_name.into(),
        }
    }

    /// Create an NFS service spec; the service name becomes `nfs.<service_id>`
    pub fn nfs(service_id: &str, pool: impl Into<String>) -> Self {
        Self::new(
            NFS_SERVICE_TYPE,
            format!("{NFS_SERVICE_TYPE}.{service_id}"),
            pool,
        )
    }

    /// Scope the spec to a namespace within the pool
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// The namespace, treating an empty string as absent
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref().filter(|ns| !ns.is_empty())
    }

    /// Check that every field needed for provisioning is present
    pub fn validate(&self) -> Result<()> {
        if self.pool.is_empty() {
            return Err(ProvisionError::InvalidSpec("pool must not be empty".into()));
        }
        if self.service_type.is_empty() {
            return Err(ProvisionError::InvalidSpec(
                "service type must not be empty".into(),
            ));
        }
        if self.service_name.is_empty() {
            return Err(ProvisionError::InvalidSpec(
                "service name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// One daemon instance of a service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DaemonIdentity {
    /// Service type the daemon belongs to
    pub service_type: String,

    /// Daemon id, unique within the service type
    pub daemon_id: String,
}

impl DaemonIdentity {
    /// Create a new daemon identity
    pub fn new(service_type: impl Into<String>, daemon_id: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            daemon_id: daemon_id.into(),
        }
    }

    /// Check that both parts of the identity are present
    pub fn validate(&self) -> Result<()> {
        if self.service_type.is_empty() || self.daemon_id.is_empty() {
            return Err(ProvisionError::InvalidSpec(format!(
                "incomplete daemon identity {self}"
            )));
        }
        // Entity names are "<type>.<id>"; a dotted type would make them ambiguous.
        if self.service_type.contains('.') {
            return Err(ProvisionError::InvalidSpec(format!(
                "service type '{}' must not contain '.'",
                self.service_type
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for DaemonIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.service_type, self.daemon_id)
    }
}
