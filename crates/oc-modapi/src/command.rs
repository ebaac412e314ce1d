//! Enumerated module command table

use std::fmt;
use std::str::FromStr;

/// Commands the daemon may send to a module
///
/// An explicit table: every dispatchable command is a variant, and anything
/// else is refused before a handler is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleCommand {
    /// Create an object of the addressed class
    Create,
    /// Update an existing object
    Update,
    /// Delete an object
    Delete,
    /// List objects of the class under a parent, paged
    ListObjects,
    /// Report the module's configuration
    GetConfig,
    /// Ask whether an update from an installed version is acceptable
    UpdateOk,
}

impl FromStr for ModuleCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "listobjects" => Ok(Self::ListObjects),
            "getconfig" => Ok(Self::GetConfig),
            "updateok" => Ok(Self::UpdateOk),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ModuleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::ListObjects => "listobjects",
            Self::GetConfig => "getconfig",
            Self::UpdateOk => "updateok",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parse_roundtrip() {
        for name in ["create", "update", "delete", "listobjects", "getconfig", "updateok"] {
            let command: ModuleCommand = name.parse().unwrap();
            assert_eq!(command.to_string(), name);
        }
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!("chown".parse::<ModuleCommand>().is_err());
        assert!("".parse::<ModuleCommand>().is_err());
    }
}
