//! Unified error type for argosync.
//!
//! All public APIs return `Result<T, SyncError>`. The variants follow the
//! failure categories a reconciliation pass can hit against the repository
//! server; gateway implementations construct them through the adapter
//! constructors below, so the drivers only ever match on variants.

use std::fmt;

/// The unified error type for all reconciliation operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    // ── Remote failures ────────────────────────────────────────────────
    /// Network or API failure while talking to the repository server.
    /// Carries the resource key the operation was attempting.
    Transport { repo: String, message: String },

    /// The remote resource does not exist. Drivers resolve this by clearing
    /// the local identifier and treating the operation as a no-op.
    NotFound(String),

    /// The server reported success but returned no payload.
    InvalidResponse { repo: String, message: String },

    /// The repository was registered but the server cannot connect to it.
    /// The registration exists; the local identifier stays persisted.
    Degraded { repo: String, message: String },

    // ── Capability negotiation ─────────────────────────────────────────
    /// The server's advertised version could not be interpreted.
    Version(String),

    /// A declared field requires a capability the connected server lacks.
    Unsupported(String),

    // ── Caller contract ────────────────────────────────────────────────
    /// The caller violated an operation precondition.
    Validation(String),
}

// ── Display ────────────────────────────────────────────────────────────

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Transport { repo, message } => {
                write!(f, "repository {}: {}", repo, message)
            }
            SyncError::NotFound(msg) => write!(f, "{}", msg),
            SyncError::InvalidResponse { repo, message } => {
                write!(f, "repository {}: {}", repo, message)
            }
            SyncError::Degraded { repo, message } => {
                write!(f, "could not connect to repository {}: {}", repo, message)
            }
            SyncError::Version(msg) => write!(f, "server version: {}", msg),
            SyncError::Unsupported(msg) => write!(f, "unsupported: {}", msg),
            SyncError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SyncError {}

// ── Convenience constructors ───────────────────────────────────────────

impl SyncError {
    /// Create a transport error for a failed remote call.
    pub fn transport(repo: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::Transport {
            repo: repo.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-response error for a success with no payload.
    pub fn invalid_response(repo: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::InvalidResponse {
            repo: repo.into(),
            message: message.into(),
        }
    }

    /// Create a degraded error for a registration the server cannot reach.
    pub fn degraded(repo: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::Degraded {
            repo: repo.into(),
            message: message.into(),
        }
    }

    /// Create a version-negotiation error.
    pub fn version(message: impl Into<String>) -> Self {
        SyncError::Version(message.into())
    }

    /// Create an unsupported-capability error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        SyncError::Unsupported(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        SyncError::Validation(message.into())
    }

    /// Classify a raw error from the repository server.
    ///
    /// The server does not expose a typed not-found error; missing resources
    /// surface as a gRPC status string. This constructor is the single place
    /// that looks at the message text: gateway implementations route every
    /// raw error through it, so the drivers match [`SyncError::NotFound`]
    /// instead of repeating the substring check.
    pub fn remote(repo: impl Into<String>, err: impl fmt::Display) -> Self {
        let message = err.to_string();
        if message.contains("NotFound") {
            SyncError::NotFound(message)
        } else {
            SyncError::Transport {
                repo: repo.into(),
                message,
            }
        }
    }

    /// Whether this error means the remote resource is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound(_))
    }
}

/// Convenience type alias for Results using SyncError.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_classifies_not_found() {
        let err = SyncError::remote(
            "https://git.example.com/repo.git",
            "rpc error: code = NotFound desc = repo not found",
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_remote_keeps_other_errors_as_transport() {
        let err = SyncError::remote("https://git.example.com/repo.git", "connection refused");
        assert_eq!(
            err,
            SyncError::Transport {
                repo: "https://git.example.com/repo.git".to_string(),
                message: "connection refused".to_string(),
            }
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_transport_display_carries_key_and_message() {
        let err = SyncError::remote("https://git.example.com/repo.git", "connection refused");
        let rendered = err.to_string();
        assert!(rendered.contains("https://git.example.com/repo.git"));
        assert!(rendered.contains("connection refused"));
    }

    #[test]
    fn test_degraded_display() {
        let err = SyncError::degraded("https://git.example.com/repo.git", "ssh: handshake failed");
        let rendered = err.to_string();
        assert!(rendered.contains("could not connect"));
        assert!(rendered.contains("https://git.example.com/repo.git"));
        assert!(rendered.contains("handshake failed"));
    }
}
