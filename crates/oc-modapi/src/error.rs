//! Module-side error type

use thiserror::Error;

/// Errors a class handler or the dispatch machinery can produce
#[derive(Error, Debug)]
pub enum ModuleError {
    /// The handler does not implement the requested command
    #[error("Command not supported by this class")]
    Unsupported,

    /// Failure with a specific error id from the shared catalog
    #[error("{message} ({errorid})")]
    Failed { errorid: u32, message: String },

    /// Registry construction problem, caught at startup
    #[error("Invalid handler registry: {0}")]
    InvalidRegistry(String),

    /// Anything else; the chain is reported in the failure response
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModuleError {
    /// Failure with an explicit error id
    pub fn failed(errorid: u32, message: impl Into<String>) -> Self {
        Self::Failed {
            errorid,
            message: message.into(),
        }
    }
}
