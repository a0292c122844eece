//! Backend access for NFS gateway provisioning.
//!
//! - [`RestfulClient`]: a [`CommandRunner`] that ships control-plane
//!   commands over HTTP
//! - [`CredentialManager`]: get-or-create principals and scope their grants
//! - [`ConfigObjectStore`]: materialize the watched configuration object
//! - [`memory`]: in-memory backends for tests and dry runs

#![doc(html_root_url = "https://docs.rs/nfs-provision-client/0.1.0")]

mod client;
mod config;
pub mod api;
pub mod memory;

pub use api::{ConfigObjectStore, CredentialManager};
pub use client::{RestfulClient, RestfulClientBuilder};
pub use config::*;
pub use nfs_provision_core::{CommandRunner, IoCtx, ObjectStore, ProvisionError, Result};
