//! Error types for artifact publishing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while publishing an artifact.
///
/// Service failures form a closed set keyed by HTTP status so callers can
/// match on the kind instead of inspecting raw codes.
#[derive(Debug, Error)]
pub enum PinError {
    /// The bearer credential is not configured. Raised before any I/O.
    #[error("pinning credential missing: {0} is not set")]
    MissingCredential(String),

    /// The artifact exceeds the configured ceiling. Raised before upload.
    #[error("artifact is {size} bytes, limit is {limit}")]
    ArtifactTooLarge { size: u64, limit: u64 },

    #[error("cannot read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A 2xx response without a usable CID.
    #[error("malformed pinning response: {0}")]
    MalformedResponse(String),

    #[error("pinning service rejected request ({status}): {body}")]
    BadRequest { status: u16, body: String },

    #[error("pinning service credential rejected ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("pinning service denied access ({status}): {body}")]
    Forbidden { status: u16, body: String },

    #[error("pinning service internal error ({status}): {body}")]
    InternalServiceError { status: u16, body: String },

    #[error("pinning service returned HTTP {status}: {body}")]
    GenericServiceHttpError { status: u16, body: String },

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),
}

impl PinError {
    /// Map a non-2xx response to its error kind.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            400 => PinError::BadRequest { status, body },
            401 => PinError::Unauthorized { status, body },
            403 => PinError::Forbidden { status, body },
            500 => PinError::InternalServiceError { status, body },
            _ => PinError::GenericServiceHttpError { status, body },
        }
    }

    /// HTTP status carried by a service error.
    pub fn status(&self) -> Option<u16> {
        match self {
            PinError::BadRequest { status, .. }
            | PinError::Unauthorized { status, .. }
            | PinError::Forbidden { status, .. }
            | PinError::InternalServiceError { status, .. }
            | PinError::GenericServiceHttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying the same upload could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PinError::InternalServiceError { .. } | PinError::GenericServiceHttpError { .. }
        )
    }
}

impl From<reqwest::Error> for PinError {
    fn from(err: reqwest::Error) -> Self {
        PinError::Transport(err.to_string())
    }
}

/// Result type for publishing operations.
pub type Result<T> = std::result::Result<T, PinError>;
