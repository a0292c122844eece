//! Authentication principals and their capability grants.

use nfs_provision_core::{
    Capabilities, CommandRunner, CredentialEntity, Keyring, MonCommand, ProvisionError, Result,
};
use tracing::info;

/// Gets or creates principals and scopes their grants
///
/// Every call goes straight to the backend; nothing is cached, and failures
/// are returned as-is without retrying.
#[derive(Debug, Clone)]
pub struct CredentialManager<R> {
    runner: R,
}

impl<R: CommandRunner> CredentialManager<R> {
    /// Create a manager over a command runner
    pub const fn new(runner: R) -> Self {
        Self { runner }
    }

    /// The underlying command runner
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Return the principal's keyring, creating the principal if needed.
    ///
    /// An existing principal keeps its key; calling this repeatedly never
    /// rotates it.
    pub async fn get_or_create_credential(&self, entity: &CredentialEntity) -> Result<Keyring> {
        info!(entity = %entity, "Create keyring");
        let output = self
            .runner
            .run_command(&MonCommand::get_or_create(entity))
            .await?;

        if !output.is_success() {
            return Err(ProvisionError::backend(
                output.status,
                format!(
                    "Unable to create keyring {entity}: {} {}",
                    output.status, output.outs
                ),
            ));
        }
        Ok(Keyring::new(output.outb))
    }

    /// Replace the principal's grants with read access to the monitors and
    /// read-write access to `pool` (narrowed to `namespace` when given).
    pub async fn update_capabilities(
        &self,
        entity: &CredentialEntity,
        pool: &str,
        namespace: Option<&str>,
    ) -> Result<()> {
        let caps = Capabilities::for_pool(pool, namespace);

        info!(entity = %entity, "Updating keyring caps");
        let output = self
            .runner
            .run_command(&MonCommand::caps(entity, &caps))
            .await?;

        if !output.is_success() {
            return Err(ProvisionError::backend(
                output.status,
                format!(
                    "Unable to update keyring caps {entity}: {} {}",
                    output.status, output.outs
                ),
            ));
        }
        Ok(())
    }
}
