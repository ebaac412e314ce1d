//! Class-path handler registry
//!
//! Class paths are colon-separated (`Mail:Box` is the Box class under
//! Mail). Handlers are registered up front and the registry is validated
//! once at startup; resolution at dispatch time is a plain lookup, and a
//! miss is the wrong-class error.

use std::collections::HashMap;

use crate::error::ModuleError;
use crate::handler::ClassHandler;

/// Registry mapping class paths to their handlers
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn ClassHandler + Send + Sync>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a class path
    pub fn register(
        mut self,
        classpath: &str,
        handler: impl ClassHandler + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(classpath.to_string(), Box::new(handler));
        self
    }

    /// Check registry consistency
    ///
    /// Every nested path must have its parent path registered too; a module
    /// that serves `Mail:Box` also serves `Mail`.
    pub fn validate(&self) -> Result<(), ModuleError> {
        if self.handlers.is_empty() {
            return Err(ModuleError::InvalidRegistry(
                "no class handlers registered".to_string(),
            ));
        }

        for path in self.handlers.keys() {
            if let Some((parent, _)) = path.rsplit_once(':') {
                if !self.handlers.contains_key(parent) {
                    return Err(ModuleError::InvalidRegistry(format!(
                        "class {} registered without its parent {}",
                        path, parent
                    )));
                }
            }
        }
        Ok(())
    }

    /// Look up the handler for a class path
    pub fn resolve(&self, classpath: &str) -> Option<&(dyn ClassHandler + Send + Sync)> {
        self.handlers.get(classpath).map(|handler| handler.as_ref())
    }

    /// Registered class paths, unordered
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullHandler;
    impl ClassHandler for NullHandler {}

    #[test]
    fn test_validate_accepts_complete_tree() {
        let registry = HandlerRegistry::new()
            .register("Mail", NullHandler)
            .register("Mail:Box", NullHandler)
            .register("Mail:Alias", NullHandler);
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_orphan_path() {
        let registry = HandlerRegistry::new().register("Mail:Box", NullHandler);
        let err = registry.validate().unwrap_err();
        assert!(matches!(err, ModuleError::InvalidRegistry(_)));
    }

    #[test]
    fn test_validate_rejects_empty_registry() {
        let registry = HandlerRegistry::new();
        assert!(registry.validate().is_err());
    }

    #[test]
    fn test_resolve_miss() {
        let registry = HandlerRegistry::new().register("Domain", NullHandler);
        assert!(registry.resolve("Domain").is_some());
        assert!(registry.resolve("DNS:Zone").is_none());
    }
}
