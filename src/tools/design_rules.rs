//! ASAP7 design rule database and its query tools
//!
//! Tools:
//! - query_design_rule: Exact layer/rule lookup
//! - search_design_rules: Keyword search across the rule set
//! - list_design_rules: Layer and rule inventory

use crate::errors::Result;
use crate::tools::registry::ToolRegistry;
use crate::tools::types::{arg_str, ToolSchema};
use serde_json::{json, Value};

const RULE_SOURCE: &str = "ASAP7 PDK Design Rule Manual";

struct RuleEntry {
    rule_type: &'static str,
    value: &'static str,
    rule_id: &'static str,
    description: &'static str,
}

struct LayerEntry {
    key: &'static str,
    layer_name: &'static str,
    description: &'static str,
    rules: &'static [RuleEntry],
}

// Values transcribed from the ASAP7 DRM; in production these would be
// parsed out of the PDK tech files.
static LAYERS: &[LayerEntry] = &[
    LayerEntry {
        key: "M1",
        layer_name: "Metal1",
        description: "First metal layer, typically used for local routing",
        rules: &[
            RuleEntry {
                rule_type: "min_width",
                value: "18nm",
                rule_id: "M1.W.1",
                description: "Minimum width for Metal1 shapes",
            },
            RuleEntry {
                rule_type: "min_spacing",
                value: "18nm",
                rule_id: "M1.S.1",
                description: "Minimum spacing between Metal1 shapes (same net)",
            },
            RuleEntry {
                rule_type: "min_spacing_diffnet",
                value: "21nm",
                rule_id: "M1.S.2",
                description: "Minimum spacing between Metal1 shapes (different nets)",
            },
            RuleEntry {
                rule_type: "min_area",
                value: "0.00202um²",
                rule_id: "M1.A.1",
                description: "Minimum area for Metal1 shapes",
            },
            RuleEntry {
                rule_type: "min_enclosure_v0",
                value: "5nm/1nm",
                rule_id: "M1.E.1",
                description: "Minimum enclosure of Via0 by Metal1 (5nm on two sides, 1nm on others)",
            },
        ],
    },
    LayerEntry {
        key: "M2",
        layer_name: "Metal2",
        description: "Second metal layer, preferred horizontal routing",
        rules: &[
            RuleEntry {
                rule_type: "min_width",
                value: "18nm",
                rule_id: "M2.W.1",
                description: "Minimum width for Metal2 shapes",
            },
            RuleEntry {
                rule_type: "min_spacing",
                value: "18nm",
                rule_id: "M2.S.1",
                description: "Minimum spacing between Metal2 shapes",
            },
            RuleEntry {
                rule_type: "min_enclosure_v1",
                value: "5nm/1nm",
                rule_id: "M2.E.1",
                description: "Minimum enclosure of Via1 by Metal2",
            },
        ],
    },
    LayerEntry {
        key: "M3",
        layer_name: "Metal3",
        description: "Third metal layer, preferred vertical routing",
        rules: &[
            RuleEntry {
                rule_type: "min_width",
                value: "18nm",
                rule_id: "M3.W.1",
                description: "Minimum width for Metal3 shapes",
            },
            RuleEntry {
                rule_type: "min_spacing",
                value: "18nm",
                rule_id: "M3.S.1",
                description: "Minimum spacing between Metal3 shapes",
            },
        ],
    },
    LayerEntry {
        key: "POLY",
        layer_name: "Polysilicon",
        description: "Gate layer for transistors",
        rules: &[
            RuleEntry {
                rule_type: "min_width",
                value: "20nm",
                rule_id: "PO.W.1",
                description: "Minimum poly width (gate length)",
            },
            RuleEntry {
                rule_type: "min_spacing",
                value: "54nm",
                rule_id: "PO.S.1",
                description: "Minimum spacing between poly shapes",
            },
            RuleEntry {
                rule_type: "min_extension",
                value: "10nm",
                rule_id: "PO.EX.1",
                description: "Minimum poly extension beyond active",
            },
        ],
    },
    LayerEntry {
        key: "ACTIVE",
        layer_name: "Active/Diffusion",
        description: "Source/drain regions for transistors",
        rules: &[
            RuleEntry {
                rule_type: "min_width",
                value: "27nm",
                rule_id: "ACT.W.1",
                description: "Minimum active width",
            },
            RuleEntry {
                rule_type: "min_spacing",
                value: "27nm",
                rule_id: "ACT.S.1",
                description: "Minimum spacing between active regions",
            },
        ],
    },
    LayerEntry {
        key: "V0",
        layer_name: "Via0",
        description: "Via between Metal1 and lower layers",
        rules: &[
            RuleEntry {
                rule_type: "size",
                value: "18nm x 18nm",
                rule_id: "V0.SZ.1",
                description: "Via0 size",
            },
            RuleEntry {
                rule_type: "min_spacing",
                value: "20nm",
                rule_id: "V0.S.1",
                description: "Minimum spacing between Via0 cuts",
            },
        ],
    },
];

/// Query interface over the static rule tables
#[derive(Debug, Clone, Copy, Default)]
pub struct DesignRuleDb;

impl DesignRuleDb {
    /// Create the database handle
    pub fn new() -> Self {
        Self
    }

    fn find_layer(&self, layer: &str) -> Option<&'static LayerEntry> {
        let wanted = layer.to_uppercase();
        LAYERS.iter().find(|entry| entry.key == wanted)
    }

    fn layer_keys(&self) -> Vec<&'static str> {
        LAYERS.iter().map(|entry| entry.key).collect()
    }

    /// Look up one rule; unknown layers and rule types come back as
    /// error-status payloads listing the valid alternatives
    pub fn query_rule(&self, layer: &str, rule_type: &str) -> Value {
        let entry = match self.find_layer(layer) {
            Some(entry) => entry,
            None => {
                return json!({
                    "status": "error",
                    "error": format!("Unknown layer: {}", layer),
                    "available_layers": self.layer_keys(),
                });
            }
        };

        let rule = match entry.rules.iter().find(|rule| rule.rule_type == rule_type) {
            Some(rule) => rule,
            None => {
                let available: Vec<&str> = entry.rules.iter().map(|rule| rule.rule_type).collect();
                return json!({
                    "status": "error",
                    "error": format!("Unknown rule type '{}' for layer {}", rule_type, layer),
                    "available_rules": available,
                });
            }
        };

        json!({
            "status": "success",
            "layer": entry.key,
            "layer_name": entry.layer_name,
            "rule_type": rule.rule_type,
            "rule_id": rule.rule_id,
            "value": rule.value,
            "description": rule.description,
            "source": RULE_SOURCE,
        })
    }

    /// Keyword search over descriptions, rule types and layer keys
    pub fn search_rules(&self, query: &str) -> Vec<Value> {
        let needle = query.to_lowercase();
        let mut results = Vec::new();

        for layer in LAYERS {
            for rule in layer.rules {
                let hit = rule.description.to_lowercase().contains(&needle)
                    || rule.rule_type.to_lowercase().contains(&needle)
                    || layer.key.to_lowercase().contains(&needle);
                if hit {
                    results.push(json!({
                        "layer": layer.key,
                        "rule_type": rule.rule_type,
                        "rule_id": rule.rule_id,
                        "value": rule.value,
                        "description": rule.description,
                    }));
                }
            }
        }

        results
    }

    /// Layer inventory: description plus rule type names per layer
    pub fn list_all_rules(&self) -> Value {
        let mut summary = serde_json::Map::new();
        for layer in LAYERS {
            let rule_types: Vec<&str> = layer.rules.iter().map(|rule| rule.rule_type).collect();
            summary.insert(
                layer.key.to_string(),
                json!({
                    "description": layer.description,
                    "rules": rule_types,
                }),
            );
        }
        Value::Object(summary)
    }
}

fn query_schema() -> ToolSchema {
    ToolSchema::new(
        "query_design_rule",
        "Query a specific design rule from the PDK. Returns the rule value and description.",
        json!({
            "type": "object",
            "properties": {
                "layer": {
                    "type": "string",
                    "description": "Layer name (e.g., M1, M2, POLY, ACTIVE, V0)"
                },
                "rule_type": {
                    "type": "string",
                    "description": "Type of rule (e.g., min_width, min_spacing, min_area, min_enclosure)"
                }
            },
            "required": ["layer", "rule_type"]
        }),
    )
}

fn search_schema() -> ToolSchema {
    ToolSchema::new(
        "search_design_rules",
        "Search for design rules matching a keyword or phrase",
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query (e.g., 'spacing', 'metal width', 'via enclosure')"
                }
            },
            "required": ["query"]
        }),
    )
}

fn list_schema() -> ToolSchema {
    ToolSchema::new(
        "list_design_rules",
        "List all available layers and their design rules",
        json!({
            "type": "object",
            "properties": {},
            "required": []
        }),
    )
}

fn handle_query(args: &Value) -> Result<String> {
    let layer = arg_str(args, "layer")?;
    let rule_type = arg_str(args, "rule_type")?;
    let result = DesignRuleDb::new().query_rule(layer, rule_type);
    Ok(serde_json::to_string_pretty(&result)?)
}

fn handle_search(args: &Value) -> Result<String> {
    let query = arg_str(args, "query")?;
    let results = DesignRuleDb::new().search_rules(query);
    let payload = json!({"results": results, "count": results.len()});
    Ok(serde_json::to_string_pretty(&payload)?)
}

fn handle_list(_args: &Value) -> Result<String> {
    let summary = DesignRuleDb::new().list_all_rules();
    Ok(serde_json::to_string_pretty(&summary)?)
}

/// Register the three design-rule tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(query_schema(), Box::new(handle_query));
    registry.register(search_schema(), Box::new(handle_search));
    registry.register(list_schema(), Box::new(handle_list));
}
