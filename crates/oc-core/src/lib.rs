//! oc-core: Shared abstractions for the OpenCORE API
//!
//! This crate provides the configuration structures, error types and small
//! domain newtypes used by the RPC client, the module API and the CLI.

pub mod config;
pub mod error;
pub mod types;

pub use config::CoreConfig;
pub use error::{ConfigError, CoreError};
pub use types::{ObjectId, SessionToken};
