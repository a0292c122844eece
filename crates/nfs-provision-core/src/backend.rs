//! Seams to the remote backends.
//!
//! Both backends are injected so the provisioning logic can run against a
//! live cluster or an in-memory fake without change.

use crate::error::Result;
use crate::types::{CommandOutput, MonCommand, ObjectStat};
use async_trait::async_trait;
use std::sync::Arc;

/// Executes control-plane commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command.
    ///
    /// Transport failures are returned as `Err`. A command the backend
    /// rejected comes back as `Ok` with a non-zero [`CommandOutput::status`];
    /// interpreting it is up to the caller.
    async fn run_command(&self, command: &MonCommand) -> Result<CommandOutput>;
}

#[async_trait]
impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    async fn run_command(&self, command: &MonCommand) -> Result<CommandOutput> {
        (**self).run_command(command).await
    }
}

/// Opens scoped handles onto pools of the object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Handle type returned by [`open_ioctx`](Self::open_ioctx)
    type Handle: IoCtx;

    /// Open a handle on `pool`, scoped to `namespace` when given.
    ///
    /// The handle is released when it is dropped, so every exit path of
    /// the caller (including early returns and a cancelled future) gives
    /// it back.
    async fn open_ioctx(&self, pool: &str, namespace: Option<&str>) -> Result<Self::Handle>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    type Handle = T::Handle;

    async fn open_ioctx(&self, pool: &str, namespace: Option<&str>) -> Result<Self::Handle> {
        (**self).open_ioctx(pool, namespace).await
    }
}

/// Object operations within one pool/namespace
#[async_trait]
pub trait IoCtx: Send + Sync {
    /// Stat an object; a missing object is [`ProvisionError::NotFound`](crate::ProvisionError::NotFound)
    async fn stat(&self, name: &str) -> Result<ObjectStat>;

    /// Replace the whole object body, creating the object if needed
    async fn write_full(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Read the whole object body
    async fn read(&self, name: &str) -> Result<Vec<u8>>;
}
