use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration handed to the deployment layer for one daemon
///
/// Serializes to `{"pool": ..., "namespace": ..., "files": {...}}`, with
/// `namespace` omitted when the service has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedConfig {
    /// Pool holding the watched configuration object
    pub pool: String,

    /// Namespace within the pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Generated files, keyed by file name
    pub files: BTreeMap<String, String>,
}

impl RenderedConfig {
    /// Contents of a generated file
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    /// The config-json payload
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
