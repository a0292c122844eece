//! Provisioning building blocks over the backend seams.

mod auth;
mod objects;

pub use auth::CredentialManager;
pub use objects::ConfigObjectStore;
