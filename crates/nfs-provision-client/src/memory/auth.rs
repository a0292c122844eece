use super::{lock, EINVAL, ENOENT};
use async_trait::async_trait;
use nfs_provision_core::{
    Capabilities, CommandOutput, CommandRunner, MonCommand, Result, AUTH_CAPS, AUTH_GET,
    AUTH_GET_OR_CREATE,
};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone)]
struct Principal {
    key: String,
    caps: Capabilities,
}

#[derive(Debug, Default)]
struct AuthState {
    principals: HashMap<String, Principal>,
    commands: Vec<MonCommand>,
    failures: HashMap<String, (i32, String)>,
    keys_issued: u64,
}

/// In-memory credential backend
///
/// Understands `auth get-or-create`, `auth get` and `auth caps`. Keys are
/// generated once per entity and never change. Keys are not random and must
/// not be used outside tests.
#[derive(Debug, Default)]
pub struct MemoryAuthBackend {
    state: Mutex<AuthState>,
}

impl MemoryAuthBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command received so far, in order
    pub fn commands(&self) -> Vec<MonCommand> {
        lock(&self.state).commands.clone()
    }

    /// Number of principals known to the backend
    pub fn entity_count(&self) -> usize {
        lock(&self.state).principals.len()
    }

    /// Current grants of a principal
    pub fn caps(&self, entity: &str) -> Option<Capabilities> {
        lock(&self.state)
            .principals
            .get(entity)
            .map(|p| p.caps.clone())
    }

    /// Current key of a principal
    pub fn key(&self, entity: &str) -> Option<String> {
        lock(&self.state)
            .principals
            .get(entity)
            .map(|p| p.key.clone())
    }

    /// Make every command with `prefix` fail with `status`
    pub fn fail_prefix(&self, prefix: &str, status: i32, message: impl Into<String>) {
        lock(&self.state)
            .failures
            .insert(prefix.to_string(), (status, message.into()));
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        lock(&self.state).failures.clear();
    }
}

fn keyring_text(entity: &str, key: &str) -> String {
    format!("[{entity}]\n\tkey = {key}\n")
}

fn parse_caps(args: &[String]) -> Option<Capabilities> {
    if args.len() % 2 != 0 {
        return None;
    }
    Some(
        args.chunks(2)
            .fold(Capabilities::new(), |caps, pair| caps.grant(&pair[0], &pair[1])),
    )
}

impl AuthState {
    fn get_or_create(&mut self, command: &MonCommand) -> CommandOutput {
        let requested = match command.caps.as_deref().map(parse_caps) {
            Some(None) => return CommandOutput::error(EINVAL, "caps must be scope/grant pairs"),
            Some(Some(caps)) => Some(caps),
            None => None,
        };

        if let Some(existing) = self.principals.get(&command.entity) {
            if let Some(caps) = requested {
                if caps != existing.caps {
                    return CommandOutput::error(
                        EINVAL,
                        format!(
                            "key for {} exists but cap does not match",
                            command.entity
                        ),
                    );
                }
            }
            return CommandOutput::ok(keyring_text(&command.entity, &existing.key));
        }

        self.keys_issued += 1;
        let key = format!("AQDmem{:030}==", self.keys_issued);
        debug!(entity = %command.entity, "creating principal");
        self.principals.insert(
            command.entity.clone(),
            Principal {
                key: key.clone(),
                caps: requested.unwrap_or_default(),
            },
        );
        CommandOutput::ok(keyring_text(&command.entity, &key))
    }

    fn get(&self, command: &MonCommand) -> CommandOutput {
        self.principals.get(&command.entity).map_or_else(
            || {
                CommandOutput::error(
                    ENOENT,
                    format!("failed to find {} in keyring", command.entity),
                )
            },
            |p| CommandOutput::ok(keyring_text(&command.entity, &p.key)),
        )
    }

    fn set_caps(&mut self, command: &MonCommand) -> CommandOutput {
        let Some(caps) = parse_caps(command.caps.as_deref().unwrap_or_default()) else {
            return CommandOutput::error(EINVAL, "caps must be scope/grant pairs");
        };
        match self.principals.get_mut(&command.entity) {
            Some(principal) => {
                principal.caps = caps;
                CommandOutput {
                    status: 0,
                    outb: String::new(),
                    outs: format!("updated caps for {}", command.entity),
                }
            }
            None => CommandOutput::error(
                ENOENT,
                format!("couldn't find entity {}", command.entity),
            ),
        }
    }
}

#[async_trait]
impl CommandRunner for MemoryAuthBackend {
    async fn run_command(&self, command: &MonCommand) -> Result<CommandOutput> {
        let mut state = lock(&self.state);
        state.commands.push(command.clone());

        if let Some((status, message)) = state.failures.get(&command.prefix) {
            return Ok(CommandOutput::error(*status, message.clone()));
        }

        Ok(match command.prefix.as_str() {
            AUTH_GET_OR_CREATE => state.get_or_create(command),
            AUTH_GET => state.get(command),
            AUTH_CAPS => state.set_caps(command),
            other => CommandOutput::error(EINVAL, format!("unknown command '{other}'")),
        })
    }
}
