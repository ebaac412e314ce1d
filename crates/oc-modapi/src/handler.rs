//! Class handler trait

use serde_json::Value;

use oc_protocol::ModuleRequest;

use crate::error::ModuleError;

/// Handler for one class in the module's hierarchy
///
/// Each method corresponds to one dispatchable command. The default
/// implementations refuse the command, so a handler only implements what
/// its class supports. Returned data (if any) is merged into the response
/// document next to `OpenCORE:Result`.
pub trait ClassHandler {
    /// Create the object named by `request.objectid`
    ///
    /// The object's fields are in `request.object_data()`, the parent
    /// context in `request.context`.
    fn create(&self, _request: &ModuleRequest) -> Result<Value, ModuleError> {
        Err(ModuleError::Unsupported)
    }

    /// Update the object named by `request.objectid`
    fn update(&self, _request: &ModuleRequest) -> Result<Value, ModuleError> {
        Err(ModuleError::Unsupported)
    }

    /// Delete the object named by `request.objectid`
    fn delete(&self, _request: &ModuleRequest) -> Result<Value, ModuleError> {
        Err(ModuleError::Unsupported)
    }

    /// List objects under `request.context`, honoring `count`/`offset`
    fn listobjects(&self, _request: &ModuleRequest) -> Result<Value, ModuleError> {
        Err(ModuleError::Unsupported)
    }
}
