//! Core types and traits for provisioning NFS gateway daemons.
//!
//! This crate provides the foundational pieces shared by the client and the
//! provisioning facade:
//!
//! - **Types**: service specs, daemon identities, credential entities and
//!   the rendered configuration payload
//! - **Backends**: the [`CommandRunner`] and [`ObjectStore`] seams
//! - **Rendering**: the pure [`render_service_config`] function
//! - **Errors**: [`ProvisionError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use nfs_provision_core::{render_service_config, DaemonIdentity, ServiceSpec};
//!
//! let identity = DaemonIdentity::new("nfs", "foo");
//! let spec = ServiceSpec::nfs("foo", "ganesha-pool");
//! let rendered = render_service_config(&identity, &spec);
//! println!("{}", rendered.to_json()?);
//! ```

#![doc(html_root_url = "https://docs.rs/nfs-provision-core/0.1.0")]

mod backend;
mod error;
mod render;
pub mod types;

pub use backend::{CommandRunner, IoCtx, ObjectStore};
pub use error::{ProvisionError, Result};
pub use render::{config_object_name, render_service_config, watch_url, GANESHA_CONF};
pub use types::*;
