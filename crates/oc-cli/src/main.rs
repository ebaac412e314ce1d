//! OpenCORE management CLI
//!
//! Thin command-line front end over the client library: bind a session,
//! issue one call, print the result. Useful for poking at a panel
//! installation and for timing individual calls.

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oc_client::{CoreSession, Endpoint};
use oc_core::config::{self, CoreConfig};
use output::{print_data, print_success};

#[derive(Parser)]
#[command(name = "opencore")]
#[command(author, version, about = "OpenCORE management client")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Remote host (defaults to the local socket)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Remote port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Disable TLS for remote connections
    #[arg(long, global = true)]
    no_ssl: bool,

    /// Socket path override for local connections
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    /// Bind as this user (anonymous bind when omitted)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Password for the bind user
    #[arg(short, long, global = true, env = "OPENCORE_PASSWORD")]
    password: Option<String>,

    /// Print the wall-clock time of each call
    #[arg(short, long, global = true)]
    timing: bool,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the daemon is answering
    Ping,

    /// List records of a class
    Records {
        /// Class identifier, e.g. Domain or Mail:Box
        classid: String,
        /// Restrict to children of this parent object
        #[arg(long)]
        parent: Option<String>,
    },

    /// Fetch a single object's record
    Record {
        /// Object identifier or name
        objectid: String,
        /// Class identifier
        #[arg(long)]
        classid: Option<String>,
    },

    /// Create an object
    Create {
        /// Class identifier
        classid: String,
        /// Human-chosen object name
        objectid: Option<String>,
        /// Parent object identifier
        #[arg(long)]
        parent: Option<String>,
        /// Object fields as a JSON document
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Update an object's fields
    Update {
        /// Class identifier
        classid: String,
        /// Object identifier or name
        objectid: String,
        /// Parent object identifier
        #[arg(long)]
        parent: Option<String>,
        /// Object fields as a JSON document
        #[arg(short, long)]
        data: String,
    },

    /// Delete an object by identifier or name
    Delete {
        /// Object identifier or name
        objectid: String,
        /// Class identifier
        #[arg(long)]
        classid: Option<String>,
    },

    /// Show class metadata
    Classinfo {
        /// Class identifier
        classid: String,
    },

    /// List registered classes
    Classes,

    /// List installed modules
    Modules,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = build_config(&cli)?;
    let session = CoreSession::with_config(Endpoint::from_config(&config), &config);

    session
        .login(cli.user.as_deref(), cli.password.as_deref())
        .await
        .context("Login failed")?;
    report_timing(&cli, &session, "login");

    match &cli.command {
        Commands::Ping => {
            session.rpc().ping().await?;
            print_success("daemon is up");
        }

        Commands::Records { classid, parent } => {
            let response = session.rpc().getrecords(classid, parent.as_deref()).await?;
            report_timing(&cli, &session, "getrecords");
            print_data(response.data());
        }

        Commands::Record { objectid, classid } => {
            let response = session.rpc().getrecord(classid.as_deref(), objectid).await?;
            report_timing(&cli, &session, "getrecord");
            print_data(response.data());
        }

        Commands::Create {
            classid,
            objectid,
            parent,
            data,
        } => {
            let data = parse_data(data.as_deref())?;
            let objid = session
                .createobject(classid, objectid.as_deref(), parent.as_deref(), data)
                .await?;
            report_timing(&cli, &session, "create");
            print_success(&format!("created {} ({})", classid, objid));
        }

        Commands::Update {
            classid,
            objectid,
            parent,
            data,
        } => {
            let data: Value =
                serde_json::from_str(data).context("--data must be a JSON document")?;
            session
                .updateobject(classid, objectid, parent.as_deref(), data)
                .await?;
            report_timing(&cli, &session, "update");
            print_success(&format!("updated {}", objectid));
        }

        Commands::Delete { objectid, classid } => {
            session.rpc().delete(classid.as_deref(), objectid).await?;
            report_timing(&cli, &session, "delete");
            print_success(&format!("deleted {}", objectid));
        }

        Commands::Classinfo { classid } => {
            let response = session.rpc().classinfo(classid).await?;
            report_timing(&cli, &session, "classinfo");
            print_data(response.data());
        }

        Commands::Classes => {
            let response = session.rpc().listclasses().await?;
            report_timing(&cli, &session, "listclasses");
            print_data(response.data());
        }

        Commands::Modules => {
            let response = session.rpc().listmodules().await?;
            report_timing(&cli, &session, "listmodules");
            print_data(response.data());
        }
    }

    session.logout().await.ok();
    Ok(())
}

/// Merge the config file (if any) with command-line overrides
fn build_config(cli: &Cli) -> Result<CoreConfig> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => CoreConfig::default(),
    };

    if let Some(host) = &cli.host {
        config.host = Some(host.clone());
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if cli.no_ssl {
        config.ssl = false;
    }
    if let Some(socket) = &cli.socket {
        config.socket_path = socket.clone();
    }

    Ok(config)
}

fn parse_data(data: Option<&str>) -> Result<Value> {
    match data {
        Some(raw) => serde_json::from_str(raw).context("--data must be a JSON document"),
        None => Ok(Value::Null),
    }
}

fn report_timing(cli: &Cli, session: &CoreSession, what: &str) {
    if !cli.timing {
        return;
    }
    if let Some(duration) = session.rpc().last_request_duration() {
        eprintln!("[{:.3}s] ({})", duration.as_secs_f64(), what);
    }
}
