//! Transports for the `/json` RPC endpoint
//!
//! The daemon listens on a local Unix domain socket and, for remote
//! management, on TCP port 4089 (normally TLS). Either way the wire carries
//! HTTP POST requests with JSON bodies. The Unix leg speaks minimal HTTP/1.1
//! directly on the stream; remote endpoints go through reqwest.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

use oc_core::config::{CoreConfig, DEFAULT_SOCKET_PATH};
use oc_core::CoreError;

/// Client identification sent with every request
const CLIENT_IDENT: &str = "oc-client";

/// Where the daemon lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Local Unix domain socket
    Unix(PathBuf),
    /// Remote TCP endpoint; `ssl` selects HTTPS
    Tcp { host: String, port: u16, ssl: bool },
}

impl Endpoint {
    /// The default local socket
    pub fn local() -> Self {
        Self::Unix(PathBuf::from(DEFAULT_SOCKET_PATH))
    }

    /// Derive the endpoint from a configuration
    ///
    /// A configured host selects the TCP endpoint; otherwise the local
    /// socket is used.
    pub fn from_config(config: &CoreConfig) -> Self {
        match &config.host {
            Some(host) => Self::Tcp {
                host: host.clone(),
                port: config.port,
                ssl: config.ssl,
            },
            None => Self::Unix(config.socket_path.clone()),
        }
    }

    /// Open a transport for this endpoint
    pub fn transport(&self) -> Box<dyn Transport> {
        match self {
            Self::Unix(path) => Box::new(UnixTransport::new(path.clone())),
            Self::Tcp { host, port, ssl } => Box::new(HttpTransport::new(host, *port, *ssl)),
        }
    }
}

/// One POST/response exchange against the daemon
///
/// Implementations own any live connection state. A failed exchange must
/// leave the transport disconnected so the next call starts fresh.
#[async_trait]
pub trait Transport: Send {
    /// POST the serialized request envelope to `/json`, returning the raw
    /// response body
    async fn post_json(&mut self, body: &[u8]) -> Result<Vec<u8>, CoreError>;

    /// Drop any live connection state
    fn invalidate(&mut self);
}

/// Minimal HTTP/1.1 over the daemon's Unix domain socket
pub struct UnixTransport {
    path: PathBuf,
    #[cfg(unix)]
    stream: Option<BufReader<tokio::net::UnixStream>>,
}

impl UnixTransport {
    /// Create a transport for the socket at `path`; connects lazily
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            #[cfg(unix)]
            stream: None,
        }
    }
}

#[cfg(unix)]
impl UnixTransport {
    async fn connect(&mut self) -> Result<(), CoreError> {
        if self.stream.is_none() {
            tracing::debug!("Connecting to {}", self.path.display());
            let stream = tokio::net::UnixStream::connect(&self.path)
                .await
                .map_err(|e| {
                    CoreError::Transport(format!("connect {}: {}", self.path.display(), e))
                })?;
            self.stream = Some(BufReader::new(stream));
        }
        Ok(())
    }

    async fn exchange(&mut self, body: &[u8]) -> Result<Vec<u8>, CoreError> {
        self.connect().await?;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| CoreError::Transport("not connected".to_string()))?;

        let request = build_post_request(body);
        stream
            .get_mut()
            .write_all(&request)
            .await
            .map_err(|e| CoreError::Transport(format!("write: {}", e)))?;

        read_http_response(stream).await
    }
}

#[async_trait]
impl Transport for UnixTransport {
    async fn post_json(&mut self, body: &[u8]) -> Result<Vec<u8>, CoreError> {
        #[cfg(unix)]
        {
            match self.exchange(body).await {
                Ok(response) => Ok(response),
                Err(e) => {
                    self.invalidate();
                    Err(e)
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = body;
            Err(CoreError::Transport(
                "Unix domain sockets are not available on this platform".to_string(),
            ))
        }
    }

    fn invalidate(&mut self) {
        #[cfg(unix)]
        {
            self.stream = None;
        }
    }
}

/// Remote endpoint over reqwest
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for `host:port`
    pub fn new(host: &str, port: u16, ssl: bool) -> Self {
        let scheme = if ssl { "https" } else { "http" };
        Self {
            url: format!("{}://{}:{}/json", scheme, host, port),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&mut self, body: &[u8]) -> Result<Vec<u8>, CoreError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("X-OpenCORE", CLIENT_IDENT)
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| CoreError::Transport(format!("POST {}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Transport(format!(
                "POST {}: HTTP {}",
                self.url, status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CoreError::Transport(format!("read body: {}", e)))?;
        Ok(bytes.to_vec())
    }

    fn invalidate(&mut self) {
        // reqwest's pool discards broken connections on its own
    }
}

/// Serialize a POST to `/json` with the given body
fn build_post_request(body: &[u8]) -> Vec<u8> {
    let mut request = format!(
        "POST /json HTTP/1.1\r\n\
         Host: localhost\r\n\
         Content-type: application/json\r\n\
         X-OpenCORE: {}\r\n\
         Content-Length: {}\r\n\
         \r\n",
        CLIENT_IDENT,
        body.len()
    )
    .into_bytes();
    request.extend_from_slice(body);
    request
}

/// Read one HTTP/1.1 response, returning its body
///
/// The daemon always answers with an explicit Content-Length; anything else
/// is treated as a transport fault.
async fn read_http_response<R>(reader: &mut R) -> Result<Vec<u8>, CoreError>
where
    R: AsyncBufRead + Unpin,
{
    let mut status_line = String::new();
    let n = reader
        .read_line(&mut status_line)
        .await
        .map_err(|e| CoreError::Transport(format!("read status: {}", e)))?;
    if n == 0 {
        return Err(CoreError::Transport("connection closed".to_string()));
    }

    let status = status_line
        .trim_end()
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| {
            CoreError::Transport(format!("malformed status line: {:?}", status_line.trim_end()))
        })?;

    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        let n = reader
            .read_line(&mut line)
            .await
            .map_err(|e| CoreError::Transport(format!("read header: {}", e)))?;
        if n == 0 {
            return Err(CoreError::Transport(
                "connection closed in headers".to_string(),
            ));
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().ok();
            }
        }
    }

    let length = content_length
        .ok_or_else(|| CoreError::Transport("response without Content-Length".to_string()))?;

    let mut body = vec![0u8; length];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|e| CoreError::Transport(format!("read body: {}", e)))?;

    if !(200..300).contains(&status) {
        return Err(CoreError::Transport(format!("HTTP {}", status)));
    }

    Ok(body)
}
