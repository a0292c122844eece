//! Per-daemon provisioning.

use nfs_provision_client::{ConfigObjectStore, CredentialManager};
use nfs_provision_core::{
    render_service_config, CommandRunner, ConfigObject, ConfigObjectOutcome, CredentialEntity,
    DaemonIdentity, Keyring, ObjectStore, RenderedConfig, Result, ServiceSpec,
};
use tracing::{debug, info, instrument};

/// Everything the deployment layer needs for one daemon
#[derive(Debug, Clone)]
pub struct ProvisionedDaemon {
    /// Principal the daemon authenticates as
    pub entity: CredentialEntity,

    /// The principal's keyring
    pub keyring: Keyring,

    /// What happened to the configuration object
    pub config_object: ConfigObjectOutcome,

    /// Rendered configuration
    pub config: RenderedConfig,
}

/// Provisions gateway daemons against a credential backend and object store
///
/// No state is kept between calls: each call asks the backends where things
/// stand and converges them to the same end state, so re-running it for a
/// provisioned daemon keeps the key, keeps any custom configuration and
/// renders the same output.
#[derive(Debug, Clone)]
pub struct ProvisioningFacade<R, S> {
    credentials: CredentialManager<R>,
    objects: ConfigObjectStore<S>,
}

impl<R: CommandRunner, S: ObjectStore> ProvisioningFacade<R, S> {
    /// Create a facade over a command runner and an object store
    pub const fn new(runner: R, store: S) -> Self {
        Self {
            credentials: CredentialManager::new(runner),
            objects: ConfigObjectStore::new(store),
        }
    }

    /// The credential manager used by this facade
    pub const fn credentials(&self) -> &CredentialManager<R> {
        &self.credentials
    }

    /// The config object store used by this facade
    pub const fn objects(&self) -> &ConfigObjectStore<S> {
        &self.objects
    }

    /// Provision a daemon and return its rendered configuration
    pub async fn provision(
        &self,
        identity: &DaemonIdentity,
        spec: &ServiceSpec,
    ) -> Result<RenderedConfig> {
        Ok(self.provision_daemon(identity, spec).await?.config)
    }

    /// Provision a daemon and return its keyring along with the configuration
    ///
    /// Stops at the first failing step; retrying is left to the caller.
    #[instrument(skip(self, identity, spec), fields(service_type = %identity.service_type, daemon_id = %identity.daemon_id))]
    pub async fn provision_daemon(
        &self,
        identity: &DaemonIdentity,
        spec: &ServiceSpec,
    ) -> Result<ProvisionedDaemon> {
        identity.validate()?;
        spec.validate()?;

        let entity = CredentialEntity::for_daemon(identity);
        let keyring = self.credentials.get_or_create_credential(&entity).await?;
        self.credentials
            .update_capabilities(&entity, &spec.pool, spec.namespace())
            .await?;

        let config_object = self
            .objects
            .ensure(&ConfigObject::for_service(spec), false)
            .await?;

        let config = render_service_config(identity, spec);
        debug!(config = ?config, "Generated config-json");
        info!(entity = %entity, config_object = %config_object, "Daemon provisioned");

        Ok(ProvisionedDaemon {
            entity,
            keyring,
            config_object,
            config,
        })
    }

    /// Replace a service's configuration object with the initial body,
    /// discarding any custom configuration
    #[instrument(skip(self, spec), fields(service = %spec.service_name))]
    pub async fn reset_config_object(&self, spec: &ServiceSpec) -> Result<ConfigObjectOutcome> {
        spec.validate()?;
        self.objects
            .ensure(&ConfigObject::for_service(spec), true)
            .await
    }
}
