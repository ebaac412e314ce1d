//! Module request/response documents
//!
//! The daemon hands a module one JSON document per invocation, keyed by
//! `OpenCORE:`-prefixed sentinel names. The module answers with a document
//! carrying an `OpenCORE:Result` object plus any extra result data merged
//! at the top level.

use serde_json::{json, Map, Value};

use crate::error::ProtocolError;
use crate::errorid::ERR_OK;

/// Command name key
pub const KEY_COMMAND: &str = "OpenCORE:Command";
/// Session metadata key (classid, objectid, paging, version)
pub const KEY_SESSION: &str = "OpenCORE:Session";
/// Parent/context object identifier key
pub const KEY_CONTEXT: &str = "OpenCORE:Context";
/// Result object key
pub const KEY_RESULT: &str = "OpenCORE:Result";

/// A parsed module invocation request
#[derive(Debug, Clone)]
pub struct ModuleRequest {
    /// Raw command name from `OpenCORE:Command`
    pub command: String,
    /// Target class identifier; empty for `getconfig`
    pub classid: String,
    /// Target object identifier; empty when the command addresses no object
    pub objectid: String,
    /// Parent/context identifier; for `listobjects` this is the parent id
    pub context: String,
    /// Result page size (`listobjects` only)
    pub count: u32,
    /// Result page offset (`listobjects` only)
    pub offset: u32,
    /// Installed version offered for upgrade (`updateok` only)
    pub currentversion: Option<String>,
    /// The complete request document
    pub tree: Value,
}

impl ModuleRequest {
    /// Parse a request document
    pub fn from_tree(tree: Value) -> Result<Self, ProtocolError> {
        let command = str_field(&tree, KEY_COMMAND)
            .ok_or(ProtocolError::MissingField(KEY_COMMAND))?
            .to_string();

        // getconfig carries no session context at all
        if command == "getconfig" {
            return Ok(Self {
                command,
                classid: String::new(),
                objectid: String::new(),
                context: String::new(),
                count: 0,
                offset: 0,
                currentversion: None,
                tree,
            });
        }

        let session = tree
            .get(KEY_SESSION)
            .ok_or(ProtocolError::MissingField(KEY_SESSION))?;

        let classid = str_field(session, "classid")
            .ok_or(ProtocolError::MissingField("classid"))?
            .to_string();
        let objectid = str_field(session, "objectid").unwrap_or_default().to_string();
        let currentversion = str_field(session, "currentversion").map(str::to_string);

        let (context, count, offset) = if command == "listobjects" {
            let parent = str_field(session, "parentid")
                .ok_or(ProtocolError::MissingField("parentid"))?
                .to_string();
            let count = uint_field(session, "count").ok_or(ProtocolError::MissingField("count"))?;
            let offset =
                uint_field(session, "offset").ok_or(ProtocolError::MissingField("offset"))?;
            (parent, count, offset)
        } else {
            let context = str_field(&tree, KEY_CONTEXT).unwrap_or_default().to_string();
            (context, 0, 0)
        };

        Ok(Self {
            command,
            classid,
            objectid,
            context,
            count,
            offset,
            currentversion,
            tree,
        })
    }

    /// The object payload for this request's class, or null when absent
    ///
    /// `create`/`update` requests carry the object's fields in a top-level
    /// member named after the class.
    pub fn object_data(&self) -> &Value {
        self.tree.get(&self.classid).unwrap_or(&Value::Null)
    }
}

/// Builder for module result documents
pub struct ResultDoc;

impl ResultDoc {
    /// Success result, optionally merged with extra top-level data
    pub fn ok(extra: Option<Value>) -> Value {
        Self::build(ERR_OK, "OK", extra)
    }

    /// Failure result carrying an error id and message
    pub fn failure(error: u32, message: impl Into<String>) -> Value {
        Self::build(error, &message.into(), None)
    }

    fn build(error: u32, message: &str, extra: Option<Value>) -> Value {
        let mut doc = Map::new();
        doc.insert(
            KEY_RESULT.to_string(),
            json!({ "error": error, "message": message }),
        );
        if let Some(Value::Object(map)) = extra {
            for (k, v) in map {
                doc.insert(k, v);
            }
        }
        Value::Object(doc)
    }
}

fn str_field<'a>(doc: &'a Value, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str)
}

/// Paging fields arrive as numbers or decimal strings depending on the
/// daemon version; accept both.
fn uint_field(doc: &Value, key: &str) -> Option<u32> {
    match doc.get(key)? {
        Value::Number(n) => n.as_u64().map(|v| v as u32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
