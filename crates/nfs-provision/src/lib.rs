//! Credential and configuration provisioning for NFS-Ganesha gateways.
//!
//! For each gateway daemon the [`ProvisioningFacade`] makes sure the daemon
//! has a principal, scopes that principal to the service's pool, creates the
//! watched configuration object if it is missing, and renders the
//! configuration the daemon is deployed with.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use nfs_provision::{DaemonIdentity, ProvisioningFacade, RestfulClient, ServiceSpec};
//!
//! #[tokio::main]
//! async fn main() -> nfs_provision::Result<()> {
//!     let client = RestfulClient::builder("https://mgr.example:8003")
//!         .credentials("admin", "api-key")
//!         .build()?;
//!     let facade = ProvisioningFacade::new(client, my_object_store);
//!
//!     let identity = DaemonIdentity::new("nfs", "foo");
//!     let spec = ServiceSpec::nfs("foo", "ganesha-pool").with_namespace("export1");
//!     let config = facade.provision(&identity, &spec).await?;
//!
//!     println!("{}", config.to_json()?);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/nfs-provision/0.1.0")]

mod facade;

pub use facade::{ProvisionedDaemon, ProvisioningFacade};

// Re-export core types
pub use nfs_provision_core::*;

// Re-export client
pub use nfs_provision_client::{
    memory, ConfigObjectStore, CredentialManager, RateLimitConfig, RestfulClient,
    RestfulClientBuilder,
};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
