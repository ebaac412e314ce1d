//! In-process mock of the OpenCORE daemon
//!
//! Speaks plain HTTP on a loopback TCP port and implements just enough of
//! the object hierarchy for the client test-suite: sessions, create with
//! name-collision detection, delete by identifier or name, records lookup.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use oc_client::Endpoint;

const ERR_OK: u32 = 0x0000;
const ERR_DBMANAGER_NOTFOUND: u32 = 0x2003;
const ERR_DBMANAGER_EXISTS: u32 = 0x2005;
const ERR_SESSION_INVALID: u32 = 0x3000;
const ERR_RPC_INVALIDCMD: u32 = 0x4006;

/// One live object in the mock hierarchy
struct StoredObject {
    uuid: String,
    classid: String,
    parentid: String,
    name: String,
    data: Value,
}

#[derive(Default)]
struct PanelState {
    sessions: HashSet<String>,
    objects: Vec<StoredObject>,
    ping_count: usize,
}

/// Handle to a running mock daemon
pub struct MockCore {
    state: Arc<Mutex<PanelState>>,
    endpoint: Endpoint,
    handle: JoinHandle<()>,
}

impl MockCore {
    /// Bind to an ephemeral loopback port and start serving
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock daemon");
        let addr = listener.local_addr().expect("local addr");
        let state = Arc::new(Mutex::new(PanelState::default()));

        let accept_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        let state = Arc::clone(&accept_state);
                        tokio::spawn(async move {
                            let _ = handle_connection(stream, state).await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self {
            state,
            endpoint: Endpoint::Tcp {
                host: "127.0.0.1".to_string(),
                port: addr.port(),
                ssl: false,
            },
            handle,
        }
    }

    /// Endpoint clients should connect to
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint.clone()
    }

    /// Number of ping commands handled so far
    pub fn ping_count(&self) -> usize {
        self.state.lock().unwrap().ping_count
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }
}

impl Drop for MockCore {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(
    stream: TcpStream,
    state: Arc<Mutex<PanelState>>,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    loop {
        // Request line; EOF means the client is done with this connection
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        if !line.starts_with("POST") {
            return Ok(());
        }

        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).await? == 0 {
                return Ok(());
            }
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).await?;

        let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        let response = handle_envelope(&request, &state);
        let encoded = serde_json::to_vec(&response).expect("serialize response");

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
            encoded.len()
        );
        writer.write_all(head.as_bytes()).await?;
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }
}

fn handle_envelope(request: &Value, state: &Arc<Mutex<PanelState>>) -> Value {
    let command = request["header"]["command"].as_str().unwrap_or_default();
    let session_id = request["header"]["session_id"].as_str();
    let body = &request["body"];

    let mut state = state.lock().unwrap();

    if command == "bind" {
        let token = uuid::Uuid::new_v4().to_string();
        state.sessions.insert(token.clone());
        return envelope(Some(&token), ERR_OK, "Login succeeded", None);
    }

    // Everything else needs an issued session token
    let token = match session_id {
        Some(token) if state.sessions.contains(token) => token.to_string(),
        _ => return envelope(None, ERR_SESSION_INVALID, "Unknown session", None),
    };

    match command {
        "ping" => {
            state.ping_count += 1;
            envelope(Some(&token), ERR_OK, "OK", None)
        }
        "logout" => {
            state.sessions.remove(&token);
            envelope(None, ERR_OK, "OK", None)
        }
        "create" => {
            let classid = body["classid"].as_str().unwrap_or_default().to_string();
            let name = body["objectid"].as_str().unwrap_or_default().to_string();
            let parentid = body["parentid"].as_str().unwrap_or_default().to_string();

            let collision = state
                .objects
                .iter()
                .any(|o| o.classid == classid && o.parentid == parentid && o.name == name);
            if collision {
                return envelope(Some(&token), ERR_DBMANAGER_EXISTS, "Object already exists", None);
            }

            let uuid = uuid::Uuid::new_v4().to_string();
            state.objects.push(StoredObject {
                uuid: uuid.clone(),
                classid,
                parentid,
                name,
                data: body["data"].clone(),
            });
            envelope(
                Some(&token),
                ERR_OK,
                "OK",
                Some(json!({ "data": { "objid": uuid } })),
            )
        }
        "update" => {
            let objectid = body["objectid"].as_str().unwrap_or_default();
            match state
                .objects
                .iter_mut()
                .find(|o| o.uuid == objectid || o.name == objectid)
            {
                Some(object) => {
                    if let (Value::Object(existing), Value::Object(update)) =
                        (&mut object.data, &body["data"])
                    {
                        for (k, v) in update {
                            existing.insert(k.clone(), v.clone());
                        }
                    } else if !body["data"].is_null() {
                        object.data = body["data"].clone();
                    }
                    envelope(Some(&token), ERR_OK, "OK", None)
                }
                None => envelope(Some(&token), ERR_DBMANAGER_NOTFOUND, "Object not found", None),
            }
        }
        "delete" => {
            let objectid = body["objectid"].as_str().unwrap_or_default();
            let classid = body["classid"].as_str();
            let position = state.objects.iter().position(|o| {
                (o.uuid == objectid || o.name == objectid)
                    && classid.map_or(true, |c| o.classid == c)
            });
            match position {
                Some(index) => {
                    state.objects.remove(index);
                    envelope(Some(&token), ERR_OK, "OK", None)
                }
                None => envelope(Some(&token), ERR_DBMANAGER_NOTFOUND, "Object not found", None),
            }
        }
        "getrecords" => {
            let classid = body["classid"].as_str().unwrap_or_default();
            let parentid = body["parentid"].as_str();

            let mut records = Map::new();
            for object in state
                .objects
                .iter()
                .filter(|o| o.classid == classid)
                .filter(|o| parentid.map_or(true, |p| o.parentid == p))
            {
                records.insert(
                    object.name.clone(),
                    json!({ "uuid": object.uuid, "data": object.data }),
                );
            }
            envelope(
                Some(&token),
                ERR_OK,
                "OK",
                Some(json!({ "data": { classid: records } })),
            )
        }
        _ => envelope(Some(&token), ERR_RPC_INVALIDCMD, "Invalid command", None),
    }
}

fn envelope(session_id: Option<&str>, errorid: u32, error: &str, body: Option<Value>) -> Value {
    let mut header = Map::new();
    if let Some(sid) = session_id {
        header.insert("session_id".to_string(), json!(sid));
    }
    header.insert("errorid".to_string(), json!(errorid));
    header.insert("error".to_string(), json!(error));

    let mut doc = Map::new();
    doc.insert("header".to_string(), Value::Object(header));
    if let Some(body) = body {
        doc.insert("body".to_string(), body);
    }
    Value::Object(doc)
}
