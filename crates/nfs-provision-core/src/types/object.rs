use super::ServiceSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration object kept in the object store for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigObject {
    /// Object name, `conf-<service_name>`
    pub name: String,

    /// Pool holding the object
    pub pool: String,

    /// Namespace within the pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Object body
    #[serde(default)]
    pub content: Vec<u8>,
}

impl ConfigObject {
    /// The object a service's gateways watch, with its initial (empty) body
    #[must_use]
    pub fn for_service(spec: &ServiceSpec) -> Self {
        Self {
            name: crate::render::config_object_name(spec),
            pool: spec.pool.clone(),
            namespace: spec.namespace().map(str::to_string),
            content: Vec::new(),
        }
    }
}

/// Result of a stat call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStat {
    /// Object size in bytes
    pub size: u64,

    /// Last modification time
    pub modified: DateTime<Utc>,
}

/// What `ensure_config_object` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigObjectOutcome {
    /// The object was absent and has been written
    Created,
    /// The object existed and was replaced
    Overwritten,
    /// The object existed and was left untouched
    Preserved,
}

impl std::fmt::Display for ConfigObjectOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Overwritten => write!(f, "overwritten"),
            Self::Preserved => write!(f, "preserved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_object_is_named_after_service() {
        let spec = ServiceSpec::nfs("foo", "nfs-ganesha").with_namespace("export1");
        let object = ConfigObject::for_service(&spec);

        assert_eq!(object.name, "conf-nfs.foo");
        assert_eq!(object.pool, "nfs-ganesha");
        assert_eq!(object.namespace.as_deref(), Some("export1"));
        assert!(object.content.is_empty());
    }

    #[test]
    fn empty_namespace_is_dropped() {
        let spec = ServiceSpec::nfs("foo", "pool").with_namespace("");
        assert_eq!(ConfigObject::for_service(&spec).namespace, None);
    }
}
