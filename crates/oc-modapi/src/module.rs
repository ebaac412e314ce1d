//! Module runner
//!
//! Performs exactly one request/response cycle: change into the module's
//! staging directory, read the framed request from stdin, dispatch, write
//! the framed response to stdout, exit. Any fault during dispatch becomes a
//! generic module-failure response; only when even that cannot be written
//! does the runner fall back to stderr and a nonzero exit.

use std::io::{BufRead, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;

use oc_core::config::CoreConfig;
use oc_protocol::errorid::{
    ERR_MODULE_FAILURE, ERR_MODULE_UPDATE, ERR_MODULE_WRONGCLASS,
};
use oc_protocol::{read_frame, write_frame, ModuleRequest, ProtocolError, ResultDoc};

use crate::command::ModuleCommand;
use crate::error::ModuleError;
use crate::handler::ClassHandler;
use crate::registry::HandlerRegistry;

/// A worker module: its name, class handlers and module-level commands
pub trait Module {
    /// Module name; selects the staging working directory
    fn name(&self) -> &str;

    /// Class handlers, validated before the request is read
    fn registry(&self) -> &HandlerRegistry;

    /// Answer `getconfig`; the returned document is merged into the response
    fn getconfig(&self) -> Result<Value, ModuleError> {
        Err(ModuleError::Unsupported)
    }

    /// Whether updating from the given installed version is acceptable
    fn updateok(&self, _currentversion: &str) -> bool {
        true
    }
}

/// Drives one module invocation
pub struct ModuleRunner {
    config: CoreConfig,
}

impl ModuleRunner {
    /// Runner with the default installation layout
    pub fn new() -> Self {
        Self {
            config: CoreConfig::default(),
        }
    }

    /// Runner with explicit configuration (staging directory)
    pub fn with_config(config: CoreConfig) -> Self {
        Self { config }
    }

    /// Serve one request on stdin/stdout and exit the process
    pub fn run(&self, module: &dyn Module) -> ! {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut input = stdin.lock();
        let mut output = stdout.lock();

        match self.serve(module, &mut input, &mut output) {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                // Even the failure response could not be written
                eprintln!("module {}: {}", module.name(), e);
                std::process::exit(1);
            }
        }
    }

    /// One request/response cycle over arbitrary streams
    ///
    /// Dispatch faults are reported in-band as a module-failure response;
    /// the returned error only signals that no response could be written.
    pub fn serve<R: BufRead, W: Write>(
        &self,
        module: &dyn Module,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), ProtocolError> {
        let doc = match self.process(module, input) {
            Ok(doc) => doc,
            Err(e) => failure_doc(&e),
        };

        let encoded = serde_json::to_vec(&doc)?;
        write_frame(output, &encoded)
    }

    fn process<R: BufRead>(
        &self,
        module: &dyn Module,
        input: &mut R,
    ) -> Result<Value, ModuleError> {
        module.registry().validate()?;

        let staging = self.config.module_staging_dir(module.name());
        std::env::set_current_dir(&staging).map_err(|e| {
            ModuleError::Other(anyhow::anyhow!(
                "cannot enter staging directory {}: {}",
                staging.display(),
                e
            ))
        })?;

        let payload = read_frame(input).map_err(module_fault)?;
        let tree: Value = serde_json::from_slice(&payload).map_err(|e| module_fault(e.into()))?;
        let request = ModuleRequest::from_tree(tree).map_err(module_fault)?;

        tracing::debug!(command = %request.command, classid = %request.classid, "module request");
        Ok(self.dispatch(module, &request))
    }

    /// Handle one parsed request, always producing a result document
    pub fn dispatch(&self, module: &dyn Module, request: &ModuleRequest) -> Value {
        let command: ModuleCommand = match request.command.parse() {
            Ok(command) => command,
            Err(()) => {
                return ResultDoc::failure(
                    ERR_MODULE_FAILURE,
                    format!("Unknown command {:?}", request.command),
                )
            }
        };

        match command {
            ModuleCommand::GetConfig => match guarded(|| module.getconfig()) {
                Ok(extra) => ResultDoc::ok(Some(extra)),
                Err(e) => failure_doc(&e),
            },
            ModuleCommand::UpdateOk => {
                let version = request.currentversion.as_deref().unwrap_or_default();
                match guarded(|| Ok(module.updateok(version))) {
                    Ok(true) => ResultDoc::ok(None),
                    Ok(false) => ResultDoc::failure(ERR_MODULE_UPDATE, "Cannot update"),
                    Err(e) => failure_doc(&e),
                }
            }
            ModuleCommand::Create
            | ModuleCommand::Update
            | ModuleCommand::Delete
            | ModuleCommand::ListObjects => {
                let handler = match module.registry().resolve(&request.classid) {
                    Some(handler) => handler,
                    None => {
                        return ResultDoc::failure(ERR_MODULE_WRONGCLASS, "Wrong class for module")
                    }
                };
                match guarded(|| call_handler(handler, command, request)) {
                    Ok(Value::Null) => ResultDoc::ok(None),
                    Ok(extra) => ResultDoc::ok(Some(extra)),
                    Err(e) => failure_doc(&e),
                }
            }
        }
    }
}

impl Default for ModuleRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn call_handler(
    handler: &(dyn ClassHandler + Send + Sync),
    command: ModuleCommand,
    request: &ModuleRequest,
) -> Result<Value, ModuleError> {
    match command {
        ModuleCommand::Create => handler.create(request),
        ModuleCommand::Update => handler.update(request),
        ModuleCommand::Delete => handler.delete(request),
        ModuleCommand::ListObjects => handler.listobjects(request),
        // Routed before handler resolution
        ModuleCommand::GetConfig | ModuleCommand::UpdateOk => Err(ModuleError::Unsupported),
    }
}

/// Run a handler with panic isolation; a panic is a module failure, not a
/// silent process death
fn guarded<T>(f: impl FnOnce() -> Result<T, ModuleError>) -> Result<T, ModuleError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic_info) => {
            let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            tracing::error!(panic = %message, "handler panicked");
            Err(ModuleError::failed(
                ERR_MODULE_FAILURE,
                format!("handler panicked: {}", message),
            ))
        }
    }
}

/// Map read/parse faults to the generic module failure id
fn module_fault(e: ProtocolError) -> ModuleError {
    ModuleError::failed(ERR_MODULE_FAILURE, e.to_string())
}

fn failure_doc(e: &ModuleError) -> Value {
    match e {
        ModuleError::Failed { errorid, message } => ResultDoc::failure(*errorid, message.clone()),
        ModuleError::Unsupported => ResultDoc::failure(ERR_MODULE_FAILURE, e.to_string()),
        ModuleError::InvalidRegistry(_) => ResultDoc::failure(ERR_MODULE_FAILURE, e.to_string()),
        // Report the whole error chain, the closest thing to a trace
        ModuleError::Other(inner) => ResultDoc::failure(ERR_MODULE_FAILURE, format!("{:#}", inner)),
    }
}
