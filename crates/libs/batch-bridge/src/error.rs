use serde::{Deserialize, Serialize};

/// Errors returned by the native runtime across the bridge.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum BridgeError {
    #[error("not implemented: {operation}")]
    NotImplemented { operation: String },

    #[error("unavailable: {reason}")]
    Unavailable { reason: String },

    /// The native SDK has not been started, or it was opted out.
    #[error("not ready: {reason}")]
    NotReady { reason: String },

    /// The remote endpoint refused the supplied credential.
    #[error("authentication rejected: {message}")]
    AuthRejected { message: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl BridgeError {
    /// Returns `true` for transient errors that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Transport { .. } | Self::NotReady { .. })
    }

    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Self::NotImplemented { operation: operation.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }
}
