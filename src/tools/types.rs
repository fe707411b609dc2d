//! Tool declaration types and argument helpers

use crate::errors::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool declaration advertised to the model
///
/// `input_schema` is a JSON-schema object; the model validates
/// arguments against it implicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name, unique within a registry
    pub name: String,

    /// Tool description shown to the model
    pub description: String,

    /// Parameter schema (JSON Schema)
    pub input_schema: Value,
}

impl ToolSchema {
    /// Create new tool schema
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Uniform handler contract: JSON arguments in, result string out
///
/// Handlers encode domain errors as payload data; an `Err` return is
/// an internal fault, converted to an error payload at the registry
/// boundary.
pub type ToolHandler = Box<dyn Fn(&Value) -> Result<String> + Send + Sync>;

/// Required string argument, or a fault naming the missing key
pub fn arg_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| crate::errors::CopilotError::Generic(format!("Missing required argument: {}", key)))
}

/// Optional string argument
pub fn arg_str_opt<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

/// Optional boolean argument with a default
pub fn arg_bool(args: &Value, key: &str, default: bool) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(default)
}
