use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Playback session disconnected: {0}")]
    Disconnected(String),
}

impl BridgeError {
    /// Returns `true` when the host reports that the session binding is gone.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, BridgeError::Disconnected(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
