//! oc-client: Client library for the OpenCORE daemon
//!
//! Opens a session to the daemon's JSON-RPC endpoint over a Unix domain
//! socket or HTTPS and exposes the generic object operations
//! (`create`/`update`/`delete`/`getrecords`/`listobjects`-family calls)
//! against the remote object hierarchy.
//!
//! ```no_run
//! use oc_client::{CoreSession, Endpoint};
//!
//! # async fn example() -> Result<(), oc_core::CoreError> {
//! let session = CoreSession::new(Endpoint::local());
//! session.login(Some("admin@example.net"), Some("secret")).await?;
//! let records = session.rpc().getrecords("Domain", None).await?;
//! println!("{}", records.data());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod keepalive;
pub mod session;
pub mod transport;

pub use client::CoreRpcClient;
pub use keepalive::Pinger;
pub use session::CoreSession;
pub use transport::{Endpoint, Transport};
