//! Error types for funnelbot
//!
//! Every fallible operation in the workspace returns [`Error`]. Component crates
//! keep their own narrow enums (payload decoding, subscription checks) and
//! convert into this one at the seams.
//!
//! | Variant | Raised by | Effect |
//! |---------|-----------|--------|
//! | Configuration | bind | aborts startup |
//! | Validation | bind | aborts startup |
//! | Decode | entry payload | logged, empty payload |
//! | Resource | missing media | logged, degraded content |
//! | ExternalService | transport, stores, sinks | aborts the current update |

use thiserror::Error;

/// All funnelbot errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid startup configuration (token, entry event, transport)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Script references an event that does not exist, or is malformed
    #[error("validation error: {0}")]
    Validation(String),

    /// Entry-command payload could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Local media resource is missing or unreadable
    #[error("resource error: {0}")]
    Resource(String),

    /// A collaborator call failed
    #[error("{service} failed: {message}")]
    ExternalService {
        /// Which collaborator failed (e.g. "send", "membership lookup")
        service: String,
        /// Failure description
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for funnelbot operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build an [`Error::ExternalService`] from any displayable failure.
    pub fn external(service: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Error::ExternalService {
            service: service.into(),
            message: err.to_string(),
        }
    }

    /// Check if this error must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::Validation(_))
    }

    /// Check if this is a collaborator failure.
    pub fn is_external(&self) -> bool {
        matches!(self, Error::ExternalService { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
