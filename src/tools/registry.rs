//! Tool registry: declaration plus handler, executed by name

use crate::tools::types::{ToolHandler, ToolSchema};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

struct RegisteredTool {
    schema: ToolSchema,
    handler: ToolHandler,
}

/// Registry mapping tool names to schemas and handlers
///
/// Execution never returns an error: unknown names, handler faults and
/// handler panics all become error payload strings, fed back to the
/// model as tool results.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<RegisteredTool>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; re-registering a name replaces the earlier entry
    pub fn register(&mut self, schema: ToolSchema, handler: ToolHandler) {
        let name = schema.name.clone();
        let entry = RegisteredTool { schema, handler };
        match self.by_name.get(&name) {
            Some(&slot) => self.entries[slot] = entry,
            None => {
                self.by_name.insert(name, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Execute a tool by name, always producing a result string
    pub fn execute(&self, name: &str, args: &Value) -> String {
        let entry = match self.by_name.get(name) {
            Some(&slot) => &self.entries[slot],
            None => return json!({"error": format!("Unknown tool: {}", name)}).to_string(),
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| (entry.handler)(args)));
        match outcome {
            Ok(Ok(payload)) => payload,
            Ok(Err(err)) => json!({"error": err.to_string()}).to_string(),
            Err(panic) => {
                let detail = panic_message(&panic);
                json!({"error": format!("Tool '{}' panicked: {}", name, detail)}).to_string()
            }
        }
    }

    /// Schemas in registration order, for the model request
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.entries.iter().map(|entry| entry.schema.clone()).collect()
    }

    /// Get a tool schema by name
    pub fn get(&self, name: &str) -> Option<&ToolSchema> {
        self.by_name.get(name).map(|&slot| &self.entries[slot].schema)
    }

    /// Check whether a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registered tool names in registration order
    pub fn tool_names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.schema.name.clone()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CopilotError;

    fn echo_schema(name: &str) -> ToolSchema {
        ToolSchema::new(
            name,
            "Echo the text argument",
            json!({
                "type": "object",
                "properties": {
                    "text": {"type": "string"}
                },
                "required": ["text"]
            }),
        )
    }

    #[test]
    fn test_register_and_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(
            echo_schema("echo"),
            Box::new(|args| Ok(args["text"].as_str().unwrap_or("").to_string())),
        );

        assert!(registry.contains("echo"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.execute("echo", &json!({"text": "hi"})), "hi");
    }

    #[test]
    fn test_unknown_tool_is_error_payload() {
        let registry = ToolRegistry::new();
        let payload = registry.execute("nope", &json!({}));

        let parsed: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed["error"], "Unknown tool: nope");
    }

    #[test]
    fn test_handler_fault_becomes_payload() {
        let mut registry = ToolRegistry::new();
        registry.register(
            echo_schema("fails"),
            Box::new(|_| Err(CopilotError::Generic("backend unavailable".to_string()))),
        );

        let payload = registry.execute("fails", &json!({}));
        let parsed: Value = serde_json::from_str(&payload).unwrap();
        assert!(parsed["error"]
            .as_str()
            .unwrap()
            .contains("backend unavailable"));
    }

    #[test]
    fn test_handler_panic_is_contained() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_schema("boom"), Box::new(|_| panic!("divide by zero")));

        let payload = registry.execute("boom", &json!({}));
        let parsed: Value = serde_json::from_str(&payload).unwrap();
        let message = parsed["error"].as_str().unwrap();
        assert!(message.contains("boom"));
        assert!(message.contains("divide by zero"));
    }

    #[test]
    fn test_reregistration_replaces_handler() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_schema("echo"), Box::new(|_| Ok("first".to_string())));
        registry.register(echo_schema("echo"), Box::new(|_| Ok("second".to_string())));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.execute("echo", &json!({})), "second");
    }

    #[test]
    fn test_schemas_preserve_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_schema("alpha"), Box::new(|_| Ok(String::new())));
        registry.register(echo_schema("beta"), Box::new(|_| Ok(String::new())));
        registry.register(echo_schema("gamma"), Box::new(|_| Ok(String::new())));

        assert_eq!(registry.tool_names(), vec!["alpha", "beta", "gamma"]);
        assert_eq!(registry.schemas().len(), 3);
        assert_eq!(registry.schemas()[1].name, "beta");
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("anything").is_none());
        assert!(registry.tool_names().is_empty());
    }
}
