use super::{Capabilities, CredentialEntity};
use serde::{Deserialize, Serialize};

/// Prefix of the get-or-create command
pub const AUTH_GET_OR_CREATE: &str = "auth get-or-create";

/// Prefix of the capability update command
pub const AUTH_CAPS: &str = "auth caps";

/// Prefix of the read-only keyring lookup
pub const AUTH_GET: &str = "auth get";

/// Command sent to the cluster control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonCommand {
    /// Command prefix, e.g. `auth caps`
    pub prefix: String,

    /// Principal the command applies to
    pub entity: String,

    /// Flattened `[scope, grant, ...]` list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caps: Option<Vec<String>>,
}

impl MonCommand {
    /// `auth get-or-create` for an entity
    #[must_use]
    pub fn get_or_create(entity: &CredentialEntity) -> Self {
        Self {
            prefix: AUTH_GET_OR_CREATE.to_string(),
            entity: entity.auth_entity().to_string(),
            caps: None,
        }
    }

    /// `auth caps` replacing the entity's grants
    #[must_use]
    pub fn caps(entity: &CredentialEntity, caps: &Capabilities) -> Self {
        Self {
            prefix: AUTH_CAPS.to_string(),
            entity: entity.auth_entity().to_string(),
            caps: Some(caps.to_args()),
        }
    }
}

/// Reply to a [`MonCommand`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Zero on success, a negative errno otherwise
    pub status: i32,

    /// Command payload
    #[serde(default)]
    pub outb: String,

    /// Status or error text
    #[serde(default)]
    pub outs: String,
}

impl CommandOutput {
    /// A successful reply carrying a payload
    pub fn ok(outb: impl Into<String>) -> Self {
        Self {
            status: 0,
            outb: outb.into(),
            outs: String::new(),
        }
    }

    /// A failed reply
    pub fn error(status: i32, outs: impl Into<String>) -> Self {
        Self {
            status,
            outb: String::new(),
            outs: outs.into(),
        }
    }

    /// Returns true if the status is zero
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DaemonIdentity;
    use serde_json::json;

    #[test]
    fn get_or_create_omits_caps() {
        let entity = CredentialEntity::for_daemon(&DaemonIdentity::new("nfs", "foo"));
        let value = serde_json::to_value(MonCommand::get_or_create(&entity)).unwrap();
        assert_eq!(
            value,
            json!({"prefix": "auth get-or-create", "entity": "client.nfs.foo"})
        );
    }

    #[test]
    fn caps_command_payload() {
        let entity = CredentialEntity::for_daemon(&DaemonIdentity::new("nfs", "foo"));
        let caps = Capabilities::for_pool("nfs-ganesha", Some("export1"));
        let value = serde_json::to_value(MonCommand::caps(&entity, &caps)).unwrap();
        assert_eq!(
            value,
            json!({
                "prefix": "auth caps",
                "entity": "client.nfs.foo",
                "caps": ["mon", "allow r",
                         "osd", "allow rw pool=nfs-ganesha namespace=export1",
                         "mds", "allow rw"]
            })
        );
    }

    #[test]
    fn output_defaults_missing_strings() {
        let out: CommandOutput = serde_json::from_str(r#"{"status": -2}"#).unwrap();
        assert!(!out.is_success());
        assert!(out.outb.is_empty());
        assert!(out.outs.is_empty());
    }
}
