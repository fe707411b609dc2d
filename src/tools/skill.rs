//! SKILL code scaffolding for Cadence Virtuoso automation
//!
//! Tools:
//! - generate_skill_code: Template-based code generation with static checks
//!
//! Generation is a deterministic template lookup keyed off the task
//! wording. Real Virtuoso integration is out of scope; the output is a
//! starting-point scaffold, not verified against a live session.

use crate::errors::Result;
use crate::tools::registry::ToolRegistry;
use crate::tools::types::{arg_bool, arg_str, ToolSchema};
use serde_json::{json, Value};

const ITERATE_INSTANCES_TEMPLATE: &str = r#"procedure({func_name}(libName cellName viewName)
    ; {description}
    let((cv results)
        cv = dbOpenCellViewByType(libName cellName viewName nil "r")
        unless(cv
            error("Could not open cellview %s/%s/%s" libName cellName viewName)
        )
        results = nil

        foreach(inst cv~>instances
            {loop_body}
        )

        dbClose(cv)
        results
    )
)"#;

const CREATE_SHAPES_TEMPLATE: &str = r#"procedure({func_name}(cv layer coords)
    ; {description}
    let((shape)
        unless(cv
            error("Invalid cellview")
        )
        shape = dbCreateRect(cv layer list({x1}:{y1} {x2}:{y2}))
        when(shape
            printf("Created rectangle on layer %s\n" layer)
        )
        shape
    )
)"#;

const SIMULATION_SETUP_TEMPLATE: &str = r#"procedure({func_name}()
    ; {description}
    let((session)
        ; Set simulator
        simulator('spectre)

        ; Configure analysis
        {analysis_code}

        ; Run simulation
        run()

        printf("Simulation complete\n")
    )
)"#;

const DEFAULT_LOOP_BODY: &str = "results = cons(inst~>cellName results)";
const DEFAULT_ANALYSIS: &str = "analysis('dc ?saveOppoint t)";

// Checked top to bottom; the first keyword hit picks the template.
const TEMPLATE_KEYWORDS: &[(&str, &[&str])] = &[
    ("create_shapes", &["rect", "shape", "draw", "polygon", "path"]),
    ("simulation_setup", &["simulat", "spectre", "testbench", "analysis"]),
    ("iterate_instances", &["instance", "iterate", "count", "cellview", "net"]),
];

const STOP_WORDS: &[&str] = &["a", "an", "the", "to", "of", "in", "and", "for", "with", "all", "that"];

/// Generated scaffold plus static-check findings
#[derive(Debug, Clone)]
pub struct GeneratedSkill {
    pub template: &'static str,
    pub code: String,
    pub warnings: Vec<String>,
}

/// Deterministic SKILL scaffold generator
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillGenerator;

impl SkillGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Render the template matching the task wording, then run the
    /// static checks over the result
    pub fn generate(
        &self,
        task_description: &str,
        include_comments: bool,
        include_error_handling: bool,
    ) -> GeneratedSkill {
        let template = select_template(task_description);
        let mut code = render_template(template, task_description);

        if !include_error_handling {
            code = strip_unless_blocks(&code);
        }
        if !include_comments {
            code = strip_comment_lines(&code);
        }

        let warnings = validate_skill_code(&code);
        GeneratedSkill {
            template,
            code,
            warnings,
        }
    }
}

fn select_template(task: &str) -> &'static str {
    let task_lower = task.to_lowercase();
    for (template, keywords) in TEMPLATE_KEYWORDS {
        if keywords.iter().any(|kw| task_lower.contains(kw)) {
            return template;
        }
    }
    "iterate_instances"
}

fn render_template(template: &'static str, task: &str) -> String {
    let description: String = task.split_whitespace().collect::<Vec<_>>().join(" ");
    match template {
        "create_shapes" => CREATE_SHAPES_TEMPLATE
            .replace("{func_name}", &derive_func_name(task, "createShape"))
            .replace("{description}", &description)
            .replace("{x1}", "0.0")
            .replace("{y1}", "0.0")
            .replace("{x2}", "1.0")
            .replace("{y2}", "1.0"),
        "simulation_setup" => SIMULATION_SETUP_TEMPLATE
            .replace("{func_name}", &derive_func_name(task, "setupSimulation"))
            .replace("{description}", &description)
            .replace("{analysis_code}", DEFAULT_ANALYSIS),
        _ => ITERATE_INSTANCES_TEMPLATE
            .replace("{func_name}", &derive_func_name(task, "iterateInstances"))
            .replace("{description}", &description)
            .replace("{loop_body}", DEFAULT_LOOP_BODY),
    }
}

/// Lower-camel-case name from the leading task words
fn derive_func_name(task: &str, fallback: &str) -> String {
    let words: Vec<String> = task
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .take(4)
        .collect();

    if words.is_empty() {
        return fallback.to_string();
    }

    let mut name = words[0].clone();
    for word in &words[1..] {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.push(first.to_ascii_uppercase());
            name.push_str(chars.as_str());
        }
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return fallback.to_string();
    }
    name
}

fn paren_balance(line: &str) -> i64 {
    let opens = line.matches('(').count() as i64;
    let closes = line.matches(')').count() as i64;
    opens - closes
}

/// Drop `unless(...)` guard blocks, tracking parens across lines
fn strip_unless_blocks(code: &str) -> String {
    let mut kept = Vec::new();
    let mut depth: i64 = 0;

    for line in code.lines() {
        if depth > 0 {
            depth += paren_balance(line);
            continue;
        }
        if line.trim_start().starts_with("unless(") {
            depth = paren_balance(line).max(0);
            continue;
        }
        kept.push(line);
    }

    kept.join("\n")
}

fn strip_comment_lines(code: &str) -> String {
    code.lines()
        .filter(|line| !line.trim_start().starts_with(';'))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Static checks mirroring the common SKILL review findings
fn validate_skill_code(code: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    if code.matches('(').count() != code.matches(')').count() {
        warnings.push("Unbalanced parentheses detected".to_string());
    }

    if code.contains("dbOpenCellView") && !code.contains("dbClose") {
        warnings.push("Cellview opened but not closed - potential memory leak".to_string());
    }

    if code.contains("foreach") && !code.contains("~>instances") && !code.contains("~>nets") {
        warnings.push("foreach without clear iteration target".to_string());
    }

    warnings
}

fn generate_schema() -> ToolSchema {
    ToolSchema::new(
        "generate_skill_code",
        "Generate SKILL code for Cadence Virtuoso automation from a natural language description",
        json!({
            "type": "object",
            "properties": {
                "task_description": {
                    "type": "string",
                    "description": "Natural language description of what the SKILL code should do"
                },
                "include_comments": {
                    "type": "boolean",
                    "description": "Whether to include explanatory comments in the code",
                    "default": true
                },
                "include_error_handling": {
                    "type": "boolean",
                    "description": "Whether to include error handling code",
                    "default": true
                }
            },
            "required": ["task_description"]
        }),
    )
}

fn handle_generate(args: &Value) -> Result<String> {
    let task = arg_str(args, "task_description")?;
    let include_comments = arg_bool(args, "include_comments", true);
    let include_error_handling = arg_bool(args, "include_error_handling", true);

    let generated = SkillGenerator::new().generate(task, include_comments, include_error_handling);
    let payload = json!({
        "status": "success",
        "template": generated.template,
        "code": generated.code,
        "warnings": generated.warnings,
    });
    Ok(serde_json::to_string_pretty(&payload)?)
}

/// Register the SKILL generation tool
pub fn register(registry: &mut ToolRegistry) {
    registry.register(generate_schema(), Box::new(handle_generate));
}
