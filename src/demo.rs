//! Canned demo scenarios
//!
//! Each scenario drives the real agent loop with a scripted model, so
//! the tool calls, registry dispatch and conversation bookkeeping run
//! exactly as they would against the API, without a key or network.

use colored::*;
use serde_json::json;
use std::sync::Arc;

use crate::agent::{AgentConfig, Copilot};
use crate::errors::{CopilotError, Result};
use crate::models::scripted::{tool_call, ScriptedClient};
use crate::models::ModelClient;
use crate::prompt::SYSTEM_PROMPT;
use crate::rag::{HashedBagEmbedder, RuleRetriever};
use crate::tools::{default_registry, DEFAULT_DOC_RESULTS};
use crate::types::ModelResponse;

/// Number of available scenarios
pub const SCENARIO_COUNT: usize = 5;

const BANNER_WIDTH: usize = 70;

const OTA_NETLIST: &str = "\
* Differential OTA
M1 out1 inp tail vss nmos w=1u l=100n
M2 out2 inn tail vss nmos w=1u l=100n
M3 out1 out1 vdd vdd pmos w=2u l=100n
M4 out2 out1 vdd vdd pmos w=2u l=100n
M5 tail bias vss vss nmos w=500n l=100n
C1 out2 0 1p
";

/// One user message plus the model responses scripted for it
struct Step {
    user: String,
    script: Vec<ModelResponse>,
}

/// A numbered demo scenario
struct Scenario {
    title: &'static str,
    context: &'static str,
    steps: Vec<Step>,
}

fn scenario_design_rules() -> Scenario {
    Scenario {
        title: "Design Rule Query",
        context: "A designer needs to know Metal1 design rules for layout.",
        steps: vec![
            Step {
                user: "What are the Metal1 design rules I should know about?".to_string(),
                script: vec![
                    tool_call("search_design_rules", json!({"query": "m1"})),
                    ModelResponse::text(
                        "Metal1 carries five rules. Width and same-net spacing are both 18nm \
                         (M1.W.1, M1.S.1), different-net spacing is 21nm (M1.S.2), minimum area \
                         is 0.00202um² (M1.A.1) and Via0 enclosure is 5nm/1nm (M1.E.1).",
                    ),
                ],
            },
            Step {
                user: "What's the minimum spacing between different nets on M1?".to_string(),
                script: vec![
                    tool_call(
                        "query_design_rule",
                        json!({"layer": "M1", "rule_type": "min_spacing_diffnet"}),
                    ),
                    ModelResponse::text(
                        "Different nets on Metal1 need at least 21nm of spacing per rule M1.S.2, \
                         compared to 18nm for shapes on the same net.",
                    ),
                ],
            },
        ],
    }
}

fn scenario_skill_generation() -> Scenario {
    Scenario {
        title: "SKILL Code Generation",
        context: "A designer wants to automate a repetitive task.",
        steps: vec![
            Step {
                user: "Generate SKILL code to find all transistors in a schematic and report \
                       their W/L ratios"
                    .to_string(),
                script: vec![
                    tool_call(
                        "generate_skill_code",
                        json!({
                            "task_description": "find all transistors in a schematic and report their W/L ratios",
                            "include_comments": true
                        }),
                    ),
                    ModelResponse::text(
                        "I generated a SKILL procedure that iterates the schematic instances so \
                         you can read each transistor's w and l properties. The validator found \
                         no issues; review the code before running it in Virtuoso.",
                    ),
                ],
            },
            Step {
                user: "Can you also add a function to calculate the total area of all transistors?"
                    .to_string(),
                script: vec![ModelResponse::text(
                    "To total the gate area, accumulate w times l inside the same foreach loop \
                     and print the sum after the loop. Convert both values to microns first so \
                     the units stay consistent.",
                )],
            },
        ],
    }
}

fn scenario_circuit_analysis() -> Scenario {
    Scenario {
        title: "Circuit Analysis",
        context: "A designer wants to understand a circuit netlist.",
        steps: vec![Step {
            user: format!(
                "Analyze this circuit netlist and tell me what simulations I should run:\n{}",
                OTA_NETLIST
            ),
            script: vec![
                tool_call("analyze_circuit", json!({"netlist": OTA_NETLIST})),
                ModelResponse::text(
                    "This netlist is a differential OTA. M1 and M2 are the input pair, M3 and \
                     M4 form the PMOS load mirror and M5 is the tail current source. Run a DC \
                     operating point first, then AC analysis for gain and phase margin. Add a \
                     transient run for settling, a noise run for input-referred noise and \
                     Monte Carlo for the matched pairs.",
                ),
            ],
        }],
    }
}

fn scenario_multi_turn() -> Scenario {
    Scenario {
        title: "Multi-turn Conversation",
        context: "A designer has a complex request that evolves.",
        steps: vec![
            Step {
                user: "I'm designing a current mirror in ASAP7. What spacing rules apply to the \
                       transistors?"
                    .to_string(),
                script: vec![
                    tool_call("search_design_rules", json!({"query": "spacing"})),
                    ModelResponse::text(
                        "For a matched mirror keep 54nm between gates (PO.S.1) and 27nm between \
                         active regions (ACT.S.1). Metal1 interconnect needs 18nm same-net and \
                         21nm different-net spacing.",
                    ),
                ],
            },
            Step {
                user: "Generate SKILL code to check if two transistors in my schematic have \
                       matching W and L"
                    .to_string(),
                script: vec![
                    tool_call(
                        "generate_skill_code",
                        json!({
                            "task_description": "check if two transistors in a schematic have matching W and L",
                            "include_error_handling": true
                        }),
                    ),
                    ModelResponse::text(
                        "The procedure fetches both instances from the open cellview and \
                         compares their w and l properties, printing a warning when they differ.",
                    ),
                ],
            },
            Step {
                user: "Modify the code to also check that they're on the same net".to_string(),
                script: vec![ModelResponse::text(
                    "Extend the comparison to the connectivity: read the net name on each \
                     matching terminal, for example inst1~>D~>net~>name against \
                     inst2~>D~>net~>name, and flag the pair when the names differ.",
                )],
            },
        ],
    }
}

fn scenario_error_handling() -> Scenario {
    Scenario {
        title: "Error Handling",
        context: "Testing robustness with unusual queries.",
        steps: vec![
            Step {
                user: "What's the minimum width for Metal99?".to_string(),
                script: vec![
                    tool_call(
                        "query_design_rule",
                        json!({"layer": "Metal99", "rule_type": "min_width"}),
                    ),
                    ModelResponse::text(
                        "There is no Metal99 layer in this PDK. The available layers are M1, \
                         M2, M3, POLY, ACTIVE and V0. If you are after an upper routing metal, \
                         M3 is the highest one in this rule set.",
                    ),
                ],
            },
            Step {
                user: "Generate SKILL code for quantum tunneling simulation".to_string(),
                script: vec![
                    tool_call(
                        "generate_skill_code",
                        json!({"task_description": "quantum tunneling simulation"}),
                    ),
                    ModelResponse::text(
                        "Circuit simulators do not model quantum tunneling directly, so I set \
                         up a generic simulation testbench template instead. For tunneling \
                         effects you would need a TCAD device simulator rather than Spectre.",
                    ),
                ],
            },
        ],
    }
}

fn build_scenario(n: usize) -> Option<Scenario> {
    match n {
        1 => Some(scenario_design_rules()),
        2 => Some(scenario_skill_generation()),
        3 => Some(scenario_circuit_analysis()),
        4 => Some(scenario_multi_turn()),
        5 => Some(scenario_error_handling()),
        _ => None,
    }
}

fn print_banner(text: &str) {
    let rule = "=".repeat(BANNER_WIDTH);
    println!("\n{}", rule.cyan());
    println!("{}", format!("  {}", text).bold().cyan());
    println!("{}", rule.cyan());
}

async fn run_scenario(number: usize, scenario: Scenario, corpus: &str) -> Result<()> {
    print_banner(&format!("SCENARIO {}: {}", number, scenario.title));
    println!("{}\n", format!("  {}", scenario.context).dimmed());

    let mut users = Vec::new();
    let mut queue = Vec::new();
    for step in scenario.steps {
        users.push(step.user);
        queue.extend(step.script);
    }

    let client: Arc<dyn ModelClient> = Arc::new(ScriptedClient::new(queue));
    let embedder = Arc::new(HashedBagEmbedder::default());
    let retriever = Arc::new(RuleRetriever::new(corpus, embedder)?);
    let registry = default_registry(retriever, DEFAULT_DOC_RESULTS);

    let config = AgentConfig {
        verbose: true,
        ..Default::default()
    };
    let mut copilot = Copilot::new(client, registry, SYSTEM_PROMPT, config);

    for user in users {
        println!("{} {}", "You:".bold(), user);
        let reply = copilot.chat(&user).await?;
        println!("\n{} {}\n", "Copilot:".green().bold(), reply);
    }

    Ok(())
}

/// Run one scenario by number, or all of them in order
pub async fn run(selection: Option<usize>, corpus: &str) -> Result<()> {
    match selection {
        Some(n) => {
            let scenario = build_scenario(n).ok_or_else(|| {
                CopilotError::Config(format!(
                    "Invalid scenario number. Choose 1-{}",
                    SCENARIO_COUNT
                ))
            })?;
            run_scenario(n, scenario, corpus).await
        }
        None => {
            for n in 1..=SCENARIO_COUNT {
                if let Some(scenario) = build_scenario(n) {
                    run_scenario(n, scenario, corpus).await?;
                }
            }
            print_banner("ALL DEMOS COMPLETE!");
            Ok(())
        }
    }
}
