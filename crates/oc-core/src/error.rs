//! Core error types for the OpenCORE API

use oc_protocol::ProtocolError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for client-side operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Transport-level fault; the underlying connection has been dropped
    #[error("Transport error: {0}")]
    Transport(String),

    /// The daemon answered with a nonzero error id
    #[error("{message} ({errorid})")]
    Remote { errorid: u32, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Build a remote error from a response header
    pub fn remote(errorid: u32, message: impl Into<String>) -> Self {
        Self::Remote {
            errorid,
            message: message.into(),
        }
    }

    /// The remote error id, if this is a remote error
    pub fn errorid(&self) -> Option<u32> {
        match self {
            Self::Remote { errorid, .. } => Some(*errorid),
            _ => None,
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
