//! Client for the authd privilege broker
//!
//! Modules run unprivileged; host actions (users, files, services, quota)
//! go through authd. The daemon hands every module an open channel to authd
//! on file descriptor 3. The protocol is line oriented: a command line of
//! space-separated, quote-escaped arguments; the reply line starts with `+`
//! on success or `-<marker>:<code>:<text>` on failure.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::io::FromRawFd;
use std::os::unix::net::UnixStream;

use thiserror::Error;

/// File descriptor the daemon inherits to every module
const AUTHD_FD: i32 = 3;

/// Errors talking to authd
#[derive(Error, Debug)]
pub enum AuthdError {
    /// I/O error on the authd channel
    #[error("authd channel error: {0}")]
    Io(#[from] std::io::Error),

    /// authd refused the command
    #[error("{message} ({code})")]
    Refused { code: u32, message: String },

    /// Reply line did not match the protocol
    #[error("malformed authd reply: {0:?}")]
    Malformed(String),
}

/// Connection to authd
pub struct AuthdClient {
    stream: BufReader<UnixStream>,
}

impl AuthdClient {
    /// Attach to the authd channel on inherited file descriptor 3
    ///
    /// # Safety
    ///
    /// Takes ownership of fd 3. Call at most once per process, and only in
    /// a module launched by the daemon (which guarantees the descriptor is
    /// the authd socket).
    pub unsafe fn from_inherited_fd() -> Self {
        let stream = UnixStream::from_raw_fd(AUTHD_FD);
        Self::from_stream(stream)
    }

    /// Attach to an explicit stream (tests, alternative wiring)
    pub fn from_stream(stream: UnixStream) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Send a raw command and await the verdict
    pub fn command(&mut self, args: &[&str]) -> Result<(), AuthdError> {
        let mut line = String::new();
        for arg in args {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&escape(arg));
        }
        line.push('\n');

        self.stream.get_mut().write_all(line.as_bytes())?;
        self.stream.get_mut().flush()?;

        let mut reply = String::new();
        self.stream.read_line(&mut reply)?;
        parse_reply(reply.trim_end())
    }

    /// Install a staged file into its live location
    pub fn installfile(&mut self, source: &str, dest: &str) -> Result<(), AuthdError> {
        self.command(&["installfile", source, dest])
    }

    /// Delete a previously installed file
    pub fn deletefile(&mut self, path: &str) -> Result<(), AuthdError> {
        self.command(&["deletefile", path])
    }

    /// Create a system user
    pub fn createuser(&mut self, username: &str, password: &str) -> Result<(), AuthdError> {
        self.command(&["createuser", username, password])
    }

    /// Delete a system user
    pub fn deleteuser(&mut self, username: &str) -> Result<(), AuthdError> {
        self.command(&["deleteuser", username])
    }

    /// Change a user's shell
    pub fn setusershell(&mut self, username: &str, shell: &str) -> Result<(), AuthdError> {
        self.command(&["setusershell", username, shell])
    }

    /// Change a user's password
    pub fn setuserpass(&mut self, username: &str, password: &str) -> Result<(), AuthdError> {
        self.command(&["setuserpass", username, password])
    }

    /// Set soft/hard quota for a user
    pub fn setquota(&mut self, username: &str, soft: u32, hard: u32) -> Result<(), AuthdError> {
        self.command(&["setquota", username, &soft.to_string(), &hard.to_string()])
    }

    /// Start a system service
    pub fn startservice(&mut self, service: &str) -> Result<(), AuthdError> {
        self.command(&["startservice", service])
    }

    /// Stop a system service
    pub fn stopservice(&mut self, service: &str) -> Result<(), AuthdError> {
        self.command(&["stopservice", service])
    }

    /// Reload a system service's configuration
    pub fn reloadservice(&mut self, service: &str) -> Result<(), AuthdError> {
        self.command(&["reloadservice", service])
    }

    /// Run a module-provided script with arguments
    pub fn runscript(&mut self, script: &str, params: &[&str]) -> Result<(), AuthdError> {
        let mut args = vec!["runscript", script];
        args.extend_from_slice(params);
        self.command(&args)
    }

    /// Create a directory
    pub fn makedir(&mut self, path: &str) -> Result<(), AuthdError> {
        self.command(&["makedir", path])
    }

    /// Delete a directory
    pub fn deletedir(&mut self, path: &str) -> Result<(), AuthdError> {
        self.command(&["deletedir", path])
    }

    /// Fetch an object through authd
    pub fn getobject(&mut self, object: &str) -> Result<(), AuthdError> {
        self.command(&["getobject", object])
    }
}

/// Backslash-escape an argument, quoting it when escaping changed anything
fn escape(arg: &str) -> String {
    let escaped = arg.replace('\\', "\\\\").replace('"', "\\\"");
    if escaped != arg {
        format!("\"{}\"", escaped)
    } else {
        escaped
    }
}

fn parse_reply(reply: &str) -> Result<(), AuthdError> {
    if reply.starts_with('+') {
        return Ok(());
    }
    if !reply.starts_with('-') {
        return Err(AuthdError::Malformed(reply.to_string()));
    }

    // -<marker>:<code>:<text>
    let mut parts = reply.splitn(3, ':');
    let _marker = parts.next();
    let code = parts
        .next()
        .and_then(|c| c.trim().parse().ok())
        .ok_or_else(|| AuthdError::Malformed(reply.to_string()))?;
    let message = parts.next().unwrap_or_default().to_string();

    Err(AuthdError::Refused { code, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader as StdBufReader};

    #[test]
    fn test_escape_plain_argument() {
        assert_eq!(escape("example.net"), "example.net");
    }

    #[test]
    fn test_escape_quotes_and_backslashes() {
        assert_eq!(escape("a\"b"), "\"a\\\"b\"");
        assert_eq!(escape("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn test_parse_success_reply() {
        assert!(parse_reply("+OK").is_ok());
    }

    #[test]
    fn test_parse_refusal_reply() {
        let err = parse_reply("-ERR:20480:Generic authd failure").unwrap_err();
        match err {
            AuthdError::Refused { code, message } => {
                assert_eq!(code, 20480);
                assert_eq!(message, "Generic authd failure");
            }
            other => panic!("expected refusal, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_garbage_reply() {
        assert!(matches!(
            parse_reply("whatever"),
            Err(AuthdError::Malformed(_))
        ));
    }

    #[test]
    fn test_command_over_socketpair() {
        let (ours, theirs) = UnixStream::pair().unwrap();

        let server = std::thread::spawn(move || {
            let mut reader = StdBufReader::new(theirs);
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            assert_eq!(line, "createuser alice hunter2\n");
            reader.get_mut().write_all(b"+OK\n").unwrap();
        });

        let mut client = AuthdClient::from_stream(ours);
        client.createuser("alice", "hunter2").unwrap();
        server.join().unwrap();
    }

    #[test]
    fn test_refused_command_over_socketpair() {
        let (ours, theirs) = UnixStream::pair().unwrap();

        let server = std::thread::spawn(move || {
            let mut reader = StdBufReader::new(theirs);
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            reader
                .get_mut()
                .write_all(b"-ERR:20480:no such user\n")
                .unwrap();
        });

        let mut client = AuthdClient::from_stream(ours);
        let err = client.deleteuser("nobody").unwrap_err();
        assert!(matches!(err, AuthdError::Refused { .. }));
        server.join().unwrap();
    }
}
