//! RPC client for the daemon's `/json` endpoint
//!
//! One call is in flight at a time; an async mutex serializes access to the
//! transport. The session token issued by the daemon is adopted from any
//! response that carries one and attached to every subsequent request.

use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tokio::sync::Mutex;

use oc_core::{CoreError, SessionToken};
use oc_protocol::{ProtocolError, RequestEnvelope, ResponseEnvelope};

use crate::transport::{Endpoint, Transport};

/// Client for the OpenCORE RPC endpoint
pub struct CoreRpcClient {
    transport: Mutex<Box<dyn Transport>>,
    session: std::sync::RwLock<Option<SessionToken>>,
    /// Wall-clock time of the most recent call, keep-alive pings excluded
    last_duration: std::sync::RwLock<Option<Duration>>,
}

impl CoreRpcClient {
    /// Create a client for the given endpoint
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            transport: Mutex::new(endpoint.transport()),
            session: std::sync::RwLock::new(None),
            last_duration: std::sync::RwLock::new(None),
        }
    }

    /// Create a client for the default local socket
    pub fn local() -> Self {
        Self::new(Endpoint::local())
    }

    /// Resume with a previously issued session token
    pub fn with_session(endpoint: Endpoint, token: SessionToken) -> Self {
        let client = Self::new(endpoint);
        *client.session.write().unwrap() = Some(token);
        client
    }

    /// The current session token, if one has been issued
    pub fn session_token(&self) -> Option<SessionToken> {
        self.session.read().unwrap().clone()
    }

    /// Elapsed wall-clock time of the most recent non-keep-alive call
    pub fn last_request_duration(&self) -> Option<Duration> {
        *self.last_duration.read().unwrap()
    }

    /// Issue a call and return the response envelope
    ///
    /// Fails with [`CoreError::Remote`] when the daemon answers with a
    /// nonzero error id. Any transport fault or malformed response drops
    /// the underlying connection; no retry is attempted here.
    pub async fn call(&self, command: &str, body: Value) -> Result<ResponseEnvelope, CoreError> {
        let session_id = self.session_token().map(|t| t.0);
        let request = RequestEnvelope::new(command, session_id, body);
        let encoded = serde_json::to_vec(&request).map_err(ProtocolError::from)?;

        tracing::debug!(command, "rpc call");
        let started = Instant::now();

        let envelope = {
            let mut transport = self.transport.lock().await;
            let raw = transport.post_json(&encoded).await?;
            match serde_json::from_slice::<ResponseEnvelope>(&raw) {
                Ok(envelope) => envelope,
                Err(e) => {
                    transport.invalidate();
                    return Err(ProtocolError::from(e).into());
                }
            }
        };

        if command != "ping" {
            *self.last_duration.write().unwrap() = Some(started.elapsed());
        }

        // Adopt the token before the error check; even a failed call may
        // carry a fresh session id.
        if let Some(sid) = &envelope.header.session_id {
            *self.session.write().unwrap() = Some(SessionToken::new(sid.clone()));
        }

        if !envelope.is_ok() {
            return Err(CoreError::remote(
                envelope.header.errorid,
                envelope.header.error.clone(),
            ));
        }

        Ok(envelope)
    }

    /// No-op keep-alive call
    pub async fn ping(&self) -> Result<(), CoreError> {
        self.call("ping", json!({})).await.map(|_| ())
    }

    /// Bind a session; the body shape is the caller's (see `CoreSession::login`)
    pub async fn bind(&self, body: Value) -> Result<ResponseEnvelope, CoreError> {
        self.call("bind", body).await
    }

    /// End the session and discard the stored token
    pub async fn logout(&self) -> Result<(), CoreError> {
        self.call("logout", json!({})).await?;
        *self.session.write().unwrap() = None;
        Ok(())
    }

    /// Create an object of `classid`, optionally named and parented
    pub async fn create(
        &self,
        classid: &str,
        objectid: Option<&str>,
        parentid: Option<&str>,
        data: Value,
    ) -> Result<ResponseEnvelope, CoreError> {
        self.call("create", object_body(classid, objectid, parentid, data))
            .await
    }

    /// Update an existing object's fields
    pub async fn update(
        &self,
        classid: &str,
        objectid: &str,
        parentid: Option<&str>,
        data: Value,
    ) -> Result<ResponseEnvelope, CoreError> {
        self.call(
            "update",
            object_body(classid, Some(objectid), parentid, data),
        )
        .await
    }

    /// Delete an object by generated identifier or human-chosen name
    pub async fn delete(
        &self,
        classid: Option<&str>,
        objectid: &str,
    ) -> Result<ResponseEnvelope, CoreError> {
        let mut body = json!({ "objectid": objectid });
        if let Some(class) = classid {
            body["classid"] = class.into();
        }
        self.call("delete", body).await
    }

    /// Fetch the records of `classid`, optionally under one parent
    pub async fn getrecords(
        &self,
        classid: &str,
        parentid: Option<&str>,
    ) -> Result<ResponseEnvelope, CoreError> {
        let mut body = json!({ "classid": classid });
        if let Some(parent) = parentid {
            body["parentid"] = parent.into();
        }
        self.call("getrecords", body).await
    }

    /// Fetch a single object's record
    pub async fn getrecord(
        &self,
        classid: Option<&str>,
        objectid: &str,
    ) -> Result<ResponseEnvelope, CoreError> {
        let mut body = json!({ "objectid": objectid });
        if let Some(class) = classid {
            body["classid"] = class.into();
        }
        self.call("getrecord", body).await
    }

    /// Class metadata (fields, constraints, capabilities)
    pub async fn classinfo(&self, classid: &str) -> Result<ResponseEnvelope, CoreError> {
        self.call("classinfo", json!({ "classid": classid })).await
    }

    /// List all registered classes
    pub async fn listclasses(&self) -> Result<ResponseEnvelope, CoreError> {
        self.call("listclasses", json!({})).await
    }

    /// List installed modules
    pub async fn listmodules(&self) -> Result<ResponseEnvelope, CoreError> {
        self.call("listmodules", json!({})).await
    }

    /// Invoke a class method on an object
    pub async fn callmethod(
        &self,
        classid: &str,
        objectid: Option<&str>,
        method: &str,
        params: Value,
    ) -> Result<ResponseEnvelope, CoreError> {
        let mut body = json!({ "classid": classid, "method": method });
        if let Some(id) = objectid {
            body["objectid"] = id.into();
        }
        if !params.is_null() {
            body["params"] = params;
        }
        self.call("callmethod", body).await
    }
}

fn object_body(classid: &str, objectid: Option<&str>, parentid: Option<&str>, data: Value) -> Value {
    let mut body = json!({ "classid": classid });
    if let Some(id) = objectid {
        body["objectid"] = id.into();
    }
    if let Some(parent) = parentid {
        body["parentid"] = parent.into();
    }
    if !data.is_null() {
        body["data"] = data;
    }
    body
}
