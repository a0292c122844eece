use thiserror::Error;

/// Result type alias for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Errors that can occur while provisioning a gateway daemon
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The credential backend answered a command with a non-zero status
    #[error("backend command failed ({code}): {message}")]
    BackendCommand {
        /// Status code returned by the backend (a negative errno)
        code: i32,
        /// Error text returned by the backend
        message: String,
    },

    /// Connecting to or writing into the object store failed
    #[error("object store error ({code}): {message}")]
    ObjectStore {
        /// Status code returned by the object store (a negative errno)
        code: i32,
        /// Error message
        message: String,
    },

    /// A looked-up object does not exist
    #[error("object not found: {object}")]
    NotFound {
        /// Name of the missing object
        object: String,
    },

    /// The command endpoint rejected our credentials
    #[error("authentication failed: invalid user or key")]
    Unauthorized,

    /// The command endpoint returned a non-success HTTP response
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Response body or extracted error message
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The service spec or daemon identity is unusable
    #[error("invalid service spec: {0}")]
    InvalidSpec(String),
}

impl ProvisionError {
    /// Build a backend command error
    pub fn backend(code: i32, message: impl Into<String>) -> Self {
        Self::BackendCommand {
            code,
            message: message.into(),
        }
    }

    /// Build an object store error
    pub fn object_store(code: i32, message: impl Into<String>) -> Self {
        Self::ObjectStore {
            code,
            message: message.into(),
        }
    }

    /// Returns true if this is the stat miss signal
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the error came from the credential or object backend
    #[must_use]
    pub const fn is_backend_error(&self) -> bool {
        matches!(self, Self::BackendCommand { .. } | Self::ObjectStore { .. })
    }

    /// Returns the backend status or HTTP code carried by this error
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::BackendCommand { code, .. } | Self::ObjectStore { code, .. } => Some(*code),
            Self::Unauthorized => Some(401),
            Self::Api { code, .. } => Some(i32::from(*code)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_keeps_code_and_message() {
        let err = ProvisionError::backend(-13, "access denied");
        assert_eq!(err.code(), Some(-13));
        assert!(err.is_backend_error());
        assert_eq!(err.to_string(), "backend command failed (-13): access denied");
    }

    #[test]
    fn not_found_is_not_a_backend_error() {
        let err = ProvisionError::NotFound {
            object: "conf-nfs.foo".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_backend_error());
        assert_eq!(err.code(), None);
    }

    #[test]
    fn api_code_is_widened() {
        let err = ProvisionError::Api {
            code: 503,
            message: "unavailable".into(),
        };
        assert_eq!(err.code(), Some(503));
    }
}
