//! Runtime setup errors.
//!
//! Everything here is raised while assembling a [`CoreConfig`](crate::config::CoreConfig)
//! or installing the logging stack, before any session is touched.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A setting or feature combination is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required host bridge was not injected.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },
}

impl Error {
    pub fn capability_missing(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Error::CapabilityMissing {
            capability: capability.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
