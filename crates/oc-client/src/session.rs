//! High-level session wrapper
//!
//! `CoreSession` owns an RPC client plus its keep-alive task and offers the
//! convenience calls most callers want: login, logout and the object
//! create/update/delete shorthand. Dropping the session stops the
//! keep-alive task.

use std::sync::Arc;

use serde_json::{json, Value};

use oc_core::{CoreConfig, CoreError, ObjectId};
use oc_protocol::ProtocolError;

use crate::client::CoreRpcClient;
use crate::keepalive::Pinger;
use crate::transport::Endpoint;

/// An authenticated (or yet-to-authenticate) session with the daemon
pub struct CoreSession {
    rpc: Arc<CoreRpcClient>,
    _pinger: Pinger,
}

impl CoreSession {
    /// Open a session against the given endpoint
    ///
    /// Must be called from within a tokio runtime; the keep-alive task is
    /// spawned immediately and pings once a session token exists.
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_config(endpoint, &CoreConfig::default())
    }

    /// Open a session with explicit configuration (keep-alive interval)
    pub fn with_config(endpoint: Endpoint, config: &CoreConfig) -> Self {
        let rpc = Arc::new(CoreRpcClient::new(endpoint));
        let pinger = Pinger::spawn(Arc::clone(&rpc), config.keepalive_interval());
        Self {
            rpc,
            _pinger: pinger,
        }
    }

    /// Open a session on the default local socket
    pub fn local() -> Self {
        Self::new(Endpoint::local())
    }

    /// Open a session from a configuration
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::with_config(Endpoint::from_config(config), config)
    }

    /// Access the underlying RPC client
    pub fn rpc(&self) -> &CoreRpcClient {
        &self.rpc
    }

    /// Bind this session to an identity
    ///
    /// Without credentials this is the anonymous/implicit bind used for
    /// local root trust; with credentials it binds as the named user. The
    /// password travels under `data.id`, the field the daemon expects.
    pub async fn login(
        &self,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), CoreError> {
        let body = match user {
            Some(user) => json!({
                "classid": "User",
                "id": user,
                "data": { "id": password.unwrap_or_default() }
            }),
            None => json!({ "classid": "User" }),
        };
        self.rpc.bind(body).await.map(|_| ())
    }

    /// End the session
    pub async fn logout(&self) -> Result<(), CoreError> {
        self.rpc.logout().await
    }

    /// Create an object and return its server-assigned identifier
    pub async fn createobject(
        &self,
        classid: &str,
        objectid: Option<&str>,
        parentid: Option<&str>,
        data: Value,
    ) -> Result<ObjectId, CoreError> {
        let response = self.rpc.create(classid, objectid, parentid, data).await?;
        response
            .objid()
            .map(ObjectId::from)
            .ok_or_else(|| ProtocolError::MissingField("objid").into())
    }

    /// Update an object's fields
    pub async fn updateobject(
        &self,
        classid: &str,
        objectid: &str,
        parentid: Option<&str>,
        data: Value,
    ) -> Result<(), CoreError> {
        self.rpc
            .update(classid, objectid, parentid, data)
            .await
            .map(|_| ())
    }

    /// Delete an object by identifier or name
    pub async fn deleteobject(&self, objectid: &str) -> Result<(), CoreError> {
        self.rpc.delete(None, objectid).await.map(|_| ())
    }
}
