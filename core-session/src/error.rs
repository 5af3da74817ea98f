//! # Session Error Types
//!
//! Errors surfaced by the session controller. Most failure modes of the
//! session bridge are deliberately *not* errors: a command aimed at a track
//! that is not loaded is ignored, and a tick that finds no metadata simply
//! stops the progress loop.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur while driving the playback session.
#[derive(Error, Debug)]
pub enum SessionError {
    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Binding to the playback session failed. The controller stays
    /// disconnected; the next `activate()` is the retry path.
    #[error("Failed to connect to playback session: {0}")]
    ConnectionFailed(String),

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// The session rejected a command or a state query.
    #[error("Transport error: {0}")]
    Transport(#[from] BridgeError),

    // ========================================================================
    // Setup Errors
    // ========================================================================
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The controller was torn down and cannot be reactivated.
    #[error("Session controller has been torn down")]
    TornDown,
}

impl SessionError {
    /// Returns `true` if retrying the operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionError::ConnectionFailed(_)
                | SessionError::Transport(BridgeError::Disconnected(_))
                | SessionError::Transport(BridgeError::NotAvailable(_))
        )
    }

    /// Returns `true` if this error is caused by a missing or lost binding.
    pub fn is_connection_error(&self) -> bool {
        match self {
            SessionError::ConnectionFailed(_) => true,
            SessionError::Transport(err) => err.is_disconnect(),
            _ => false,
        }
    }
}

impl From<core_runtime::Error> for SessionError {
    fn from(err: core_runtime::Error) -> Self {
        match err {
            core_runtime::Error::Config(message) => SessionError::Config(message),
            core_runtime::Error::CapabilityMissing {
                capability,
                message,
            } => SessionError::Config(format!("{} missing: {}", capability, message)),
        }
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
