//! Tool system: uniform execute-by-name over the domain tools
//!
//! Tools registered by default:
//! - query_design_rule / search_design_rules / list_design_rules
//! - analyze_circuit
//! - generate_skill_code
//! - query_documentation (retrieval pipeline wrapped as a tool)

pub mod design_rules;
pub mod netlist;
pub mod registry;
pub mod skill;
pub mod types;

pub use registry::ToolRegistry;
pub use types::{ToolHandler, ToolSchema};

use crate::rag::RuleRetriever;
use crate::tools::types::{arg_str, arg_str_opt};
use serde_json::json;
use std::sync::Arc;

/// Default number of rules returned by the documentation tool
pub const DEFAULT_DOC_RESULTS: usize = 3;

fn query_documentation_schema() -> ToolSchema {
    ToolSchema::new(
        "query_documentation",
        "Search the ASAP7 design rule manual and return the most relevant rules as context",
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Natural language question about design rules"
                },
                "layer": {
                    "type": "string",
                    "description": "Optional layer filter (e.g., Metal1, Poly)"
                }
            },
            "required": ["query"]
        }),
    )
}

/// Register the documentation tool backed by a shared retriever
pub fn register_documentation_tool(
    registry: &mut ToolRegistry,
    retriever: Arc<RuleRetriever>,
    n_results: usize,
) {
    registry.register(
        query_documentation_schema(),
        Box::new(move |args| {
            let query = arg_str(args, "query")?;
            let layer = arg_str_opt(args, "layer");
            let context = retriever.query(query, n_results, layer);
            Ok(json!({"context": context}).to_string())
        }),
    );
}

/// Build the full registry: the three rule tools, the netlist analyzer,
/// the SKILL generator and the documentation search
pub fn default_registry(retriever: Arc<RuleRetriever>, doc_results: usize) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    skill::register(&mut registry);
    netlist::register(&mut registry);
    design_rules::register(&mut registry);
    register_documentation_tool(&mut registry, retriever, doc_results);
    registry
}
