//! Protocol error type

use thiserror::Error;

/// Errors arising while encoding or decoding protocol documents
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// I/O error while reading or writing a frame
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Length prefix was not a decimal byte count
    #[error("Invalid length prefix: {0:?}")]
    InvalidLength(String),

    /// Declared payload length exceeds the accepted maximum
    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Input ended before a complete frame was read
    #[error("Unexpected end of input")]
    UnexpectedEof,

    /// Payload was not a well-formed JSON document
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// A required document field is absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
