use super::DaemonIdentity;
use serde::{Deserialize, Serialize};

/// Cluster daemon types whose principals are named after the daemon itself.
/// Everything else (nfs, rgw, rbd-mirror, crash, iscsi, ...) lives in the
/// `client.` section.
const DAEMON_SECTION_TYPES: &[&str] = &["mon", "osd", "mds", "mgr"];

/// Authentication principal for one daemon
///
/// The [`name`](Self::name) is the user id the gateway authenticates as and
/// is what the rendered configuration refers to. The
/// [`auth_entity`](Self::auth_entity) is the same principal in the
/// backend's section form, which is what `auth` commands expect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialEntity {
    name: String,
    auth_entity: String,
}

impl CredentialEntity {
    /// Derive the entity for a daemon
    ///
    /// Names are collision-free only for identities that pass
    /// [`DaemonIdentity::validate`]: a dotted service type such as
    /// `("nfs.a", "b")` yields the same name as `("nfs", "a.b")`.
    #[must_use]
    pub fn for_daemon(identity: &DaemonIdentity) -> Self {
        debug_assert!(
            !identity.service_type.contains('.'),
            "dotted service type '{}'",
            identity.service_type
        );
        let name = format!("{}.{}", identity.service_type, identity.daemon_id);
        let auth_entity = if DAEMON_SECTION_TYPES.contains(&identity.service_type.as_str()) {
            name.clone()
        } else {
            format!("client.{name}")
        };
        Self { name, auth_entity }
    }

    /// User id, e.g. `nfs.foo`
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Section-qualified principal, e.g. `client.nfs.foo`
    #[must_use]
    pub fn auth_entity(&self) -> &str {
        &self.auth_entity
    }
}

impl std::fmt::Display for CredentialEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.auth_entity)
    }
}

/// Secret credential material returned by the backend
///
/// The text is kept verbatim. It usually looks like:
///
/// ```text
/// [client.nfs.foo]
///         key = AQBq...==
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Keyring(String);

impl Keyring {
    /// Wrap keyring text
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The keyring text as returned by the backend
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `[section]` header, if present
    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        self.0.lines().find_map(|line| {
            line.trim()
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
        })
    }

    /// The value of the `key = ...` line, if present
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.0.lines().find_map(|line| {
            let (field, value) = line.split_once('=')?;
            (field.trim() == "key").then(|| value.trim())
        })
    }
}

impl std::fmt::Debug for Keyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyring")
            .field("entity", &self.entity())
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Ordered capability grants, one per scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities(Vec<(String, String)>);

impl Capabilities {
    /// Create an empty grant set
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Grants for a gateway confined to one pool (and optionally a namespace)
    #[must_use]
    pub fn for_pool(pool: &str, namespace: Option<&str>) -> Self {
        let mut osd = format!("allow rw pool={pool}");
        if let Some(ns) = namespace {
            osd.push_str(" namespace=");
            osd.push_str(ns);
        }

        // TODO: drop the mds grant once the backend no longer expects it;
        // the gateway itself never talks to an mds.
        Self::new()
            .grant("mon", "allow r")
            .grant("osd", osd)
            .grant("mds", "allow rw")
    }

    /// Append a grant for a scope
    #[must_use]
    pub fn grant(mut self, scope: impl Into<String>, grant: impl Into<String>) -> Self {
        self.0.push((scope.into(), grant.into()));
        self
    }

    /// The grant for a scope, if any
    #[must_use]
    pub fn get(&self, scope: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(s, _)| s == scope)
            .map(|(_, grant)| grant.as_str())
    }

    /// Flatten into the `[scope, grant, ...]` wire form
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(scope, grant)| [scope.clone(), grant.clone()])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfs_entity_uses_client_section() {
        let entity = CredentialEntity::for_daemon(&DaemonIdentity::new("nfs", "foo"));
        assert_eq!(entity.name(), "nfs.foo");
        assert_eq!(entity.auth_entity(), "client.nfs.foo");
        assert_eq!(entity.to_string(), "client.nfs.foo");
    }

    #[test]
    fn cluster_daemons_keep_their_name() {
        let entity = CredentialEntity::for_daemon(&DaemonIdentity::new("mds", "a"));
        assert_eq!(entity.auth_entity(), "mds.a");
    }

    #[test]
    fn unknown_types_do_not_collapse() {
        let a = CredentialEntity::for_daemon(&DaemonIdentity::new("custom", "x"));
        let b = CredentialEntity::for_daemon(&DaemonIdentity::new("other", "x"));
        assert_ne!(a.auth_entity(), b.auth_entity());
        assert_eq!(a.auth_entity(), "client.custom.x");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "dotted service type")]
    fn dotted_service_type_is_refused() {
        let _ = CredentialEntity::for_daemon(&DaemonIdentity::new("nfs.a", "b"));
    }

    #[test]
    fn client_type_is_not_passed_through() {
        // ("client", "nfs.foo") must not alias ("nfs", "foo")
        let client = CredentialEntity::for_daemon(&DaemonIdentity::new("client", "nfs.foo"));
        let nfs = CredentialEntity::for_daemon(&DaemonIdentity::new("nfs", "foo"));
        assert_ne!(client.auth_entity(), nfs.auth_entity());
    }

    #[test]
    fn keyring_fields() {
        let keyring = Keyring::new("[client.nfs.foo]\n\tkey = AQBsecret==\n");
        assert_eq!(keyring.entity(), Some("client.nfs.foo"));
        assert_eq!(keyring.key(), Some("AQBsecret=="));
    }

    #[test]
    fn keyring_debug_redacts_key() {
        let keyring = Keyring::new("[client.nfs.foo]\n\tkey = AQBsecret==\n");
        let debug = format!("{keyring:?}");
        assert!(!debug.contains("AQBsecret"));
        assert!(debug.contains("client.nfs.foo"));
    }

    #[test]
    fn pool_caps_without_namespace() {
        let caps = Capabilities::for_pool("ganesha-pool", None);
        assert_eq!(caps.get("osd"), Some("allow rw pool=ganesha-pool"));
        assert_eq!(
            caps.to_args(),
            vec![
                "mon",
                "allow r",
                "osd",
                "allow rw pool=ganesha-pool",
                "mds",
                "allow rw"
            ]
        );
    }

    #[test]
    fn pool_caps_with_namespace() {
        let caps = Capabilities::for_pool("nfs-ganesha", Some("export1"));
        assert_eq!(
            caps.get("osd"),
            Some("allow rw pool=nfs-ganesha namespace=export1")
        );
    }
}
