//! Request/response envelopes for the `/json` RPC endpoint
//!
//! Every call is an HTTP POST carrying a JSON request envelope; the reply is
//! a JSON response envelope. The header routes the call (command name plus
//! the session token, once one has been issued); the body is command-specific.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errorid::ERR_OK;

/// Header of a request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestHeader {
    /// Command name, e.g. `bind`, `create`, `getrecords`
    pub command: String,
    /// Session token; absent on the very first call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A complete request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub header: RequestHeader,
    pub body: Value,
}

impl RequestEnvelope {
    /// Build an envelope for the given command
    pub fn new(command: impl Into<String>, session_id: Option<String>, body: Value) -> Self {
        Self {
            header: RequestHeader {
                command: command.into(),
                session_id,
            },
            body,
        }
    }
}

/// Header of a response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseHeader {
    /// Session token; the client must adopt it when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Zero means success
    pub errorid: u32,
    /// Human-readable status, "OK" on success
    #[serde(default)]
    pub error: String,
}

/// A complete response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub header: ResponseHeader,
    /// Command-specific result; may be absent on errors
    #[serde(default)]
    pub body: Value,
}

impl ResponseEnvelope {
    /// Whether the call succeeded
    pub fn is_ok(&self) -> bool {
        self.header.errorid == ERR_OK
    }

    /// The created object's server-assigned identifier, if the body has one
    ///
    /// `create` responses nest it under `body.data.objid`.
    pub fn objid(&self) -> Option<&str> {
        self.body.get("data")?.get("objid")?.as_str()
    }

    /// The `data` subtree of the body, or null when absent
    pub fn data(&self) -> &Value {
        self.body.get("data").unwrap_or(&Value::Null)
    }
}
