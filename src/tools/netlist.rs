//! SPICE netlist triage: device extraction and topology hints
//!
//! Tools:
//! - analyze_circuit: Parse a netlist, count devices, suggest simulations

use crate::errors::Result;
use crate::tools::registry::ToolRegistry;
use crate::tools::types::{arg_str, ToolSchema};
use anyhow::Context;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

// Element prefix conventions from SPICE; the trailing group of each
// pattern is a parameter, not a terminal.
const DEVICE_PATTERNS: &[(&str, &str)] = &[
    ("nmos", r"(?i)^[Mm]\w+\s+(\w+)\s+(\w+)\s+(\w+)\s+(\w+)\s+nmos"),
    ("pmos", r"(?i)^[Mm]\w+\s+(\w+)\s+(\w+)\s+(\w+)\s+(\w+)\s+pmos"),
    ("resistor", r"(?i)^[Rr]\w+\s+(\w+)\s+(\w+)\s+([\d.]+[kKmMgG]?)"),
    ("capacitor", r"(?i)^[Cc]\w+\s+(\w+)\s+(\w+)\s+([\d.]+[pPnNuUfF]?)"),
    ("inductor", r"(?i)^[Ll]\w+\s+(\w+)\s+(\w+)\s+([\d.]+[nNuUmM]?[Hh]?)"),
    ("voltage", r"(?i)^[Vv]\w+\s+(\w+)\s+(\w+)\s+([\d.]+)"),
    ("current", r"(?i)^[Ii]\w+\s+(\w+)\s+(\w+)\s+([\d.]+)"),
];

/// One parsed netlist element
#[derive(Debug, Clone)]
pub struct Device {
    pub name: String,
    pub device_type: &'static str,
    pub terminals: Vec<String>,
    pub raw: String,
}

/// Analysis summary fed back to the model as JSON
#[derive(Debug, Clone, Serialize)]
pub struct CircuitAnalysis {
    pub device_count: BTreeMap<String, usize>,
    pub topology_hints: Vec<String>,
    pub potential_issues: Vec<String>,
    pub recommended_simulations: Vec<String>,
}

/// Netlist parser plus heuristic topology checks
pub struct CircuitAnalyzer {
    patterns: Vec<(&'static str, Regex)>,
}

impl CircuitAnalyzer {
    /// Compile the device patterns
    pub fn new() -> anyhow::Result<Self> {
        let mut patterns = Vec::with_capacity(DEVICE_PATTERNS.len());
        for (device_type, pattern) in DEVICE_PATTERNS {
            let regex = Regex::new(pattern)
                .with_context(|| format!("invalid device pattern for {}", device_type))?;
            patterns.push((*device_type, regex));
        }
        Ok(Self { patterns })
    }

    /// Extract devices line by line; comments and blanks are skipped,
    /// the first matching pattern classifies a line
    pub fn parse_netlist(&self, netlist: &str) -> Vec<Device> {
        let mut devices = Vec::new();

        for line in netlist.trim().lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('*') {
                continue;
            }

            for (device_type, regex) in &self.patterns {
                if let Some(captures) = regex.captures(line) {
                    let name = line.split_whitespace().next().unwrap_or("").to_string();
                    let group_count = captures.len() - 1;
                    let terminals = (1..group_count)
                        .filter_map(|i| captures.get(i))
                        .map(|m| m.as_str().to_string())
                        .collect();

                    devices.push(Device {
                        name,
                        device_type,
                        terminals,
                        raw: line.to_string(),
                    });
                    break;
                }
            }
        }

        devices
    }

    /// Full triage: counts, topology hints, issues, simulation plan
    pub fn analyze(&self, netlist: &str) -> CircuitAnalysis {
        let devices = self.parse_netlist(netlist);

        let mut device_count: BTreeMap<String, usize> = BTreeMap::new();
        for device in &devices {
            *device_count.entry(device.device_type.to_string()).or_insert(0) += 1;
        }

        let topology_hints = detect_topologies(&device_count);
        let potential_issues = check_issues(&device_count);
        let recommended_simulations = recommend_simulations(&device_count, &topology_hints);

        CircuitAnalysis {
            device_count,
            topology_hints,
            potential_issues,
            recommended_simulations,
        }
    }
}

fn count_of(counts: &BTreeMap<String, usize>, device_type: &str) -> usize {
    counts.get(device_type).copied().unwrap_or(0)
}

fn detect_topologies(counts: &BTreeMap<String, usize>) -> Vec<String> {
    let mut hints = Vec::new();

    let nmos = count_of(counts, "nmos");
    let pmos = count_of(counts, "pmos");

    if nmos >= 2 || pmos >= 2 {
        hints.push("Possible differential pair (matched transistor pair)".to_string());
    }
    if nmos >= 2 {
        hints.push("Possible NMOS current mirror".to_string());
    }
    if pmos >= 2 {
        hints.push("Possible PMOS current mirror".to_string());
    }

    if nmos > 0 && pmos > 0 {
        let total = nmos + pmos;
        if total <= 4 {
            hints.push("Possible single-stage amplifier".to_string());
        } else if total <= 8 {
            hints.push("Possible two-stage amplifier (OTA)".to_string());
        } else {
            hints.push("Complex multi-stage circuit".to_string());
        }
    }

    if count_of(counts, "resistor") > 0 && count_of(counts, "capacitor") > 0 {
        hints.push("Contains RC network (possible filter/compensation)".to_string());
    }

    hints
}

fn check_issues(counts: &BTreeMap<String, usize>) -> Vec<String> {
    let mut issues = Vec::new();

    let nmos = count_of(counts, "nmos");
    let pmos = count_of(counts, "pmos");

    if nmos % 2 != 0 && nmos > 1 {
        issues.push(format!(
            "Odd number of NMOS ({}) - check for intentional asymmetry",
            nmos
        ));
    }
    if pmos % 2 != 0 && pmos > 1 {
        issues.push(format!(
            "Odd number of PMOS ({}) - check for intentional asymmetry",
            pmos
        ));
    }

    if count_of(counts, "current") == 0 && count_of(counts, "voltage") <= 1 {
        issues.push("No explicit bias sources - verify biasing scheme".to_string());
    }

    issues
}

fn recommend_simulations(counts: &BTreeMap<String, usize>, topologies: &[String]) -> Vec<String> {
    let mut sims = vec!["DC operating point (always start here)".to_string()];

    if topologies.iter().any(|t| t.to_lowercase().contains("amplifier")) {
        sims.push("AC analysis (gain, bandwidth, phase margin)".to_string());
    }
    if count_of(counts, "capacitor") > 0 {
        sims.push("Transient analysis (settling, slew rate)".to_string());
    }
    if count_of(counts, "nmos") > 0 || count_of(counts, "pmos") > 0 {
        sims.push("Noise analysis (input-referred noise)".to_string());
    }
    if topologies
        .iter()
        .any(|t| t.to_lowercase().contains("differential") || t.to_lowercase().contains("mirror"))
    {
        sims.push("Monte Carlo (mismatch sensitivity)".to_string());
    }

    sims
}

fn analyze_schema() -> ToolSchema {
    ToolSchema::new(
        "analyze_circuit",
        "Analyze a SPICE netlist to identify devices, detect circuit topology, and recommend simulations",
        json!({
            "type": "object",
            "properties": {
                "netlist": {
                    "type": "string",
                    "description": "SPICE netlist content to analyze"
                }
            },
            "required": ["netlist"]
        }),
    )
}

fn handle_analyze(args: &Value) -> Result<String> {
    let netlist = arg_str(args, "netlist")?;
    let analyzer = CircuitAnalyzer::new()?;
    let analysis = analyzer.analyze(netlist);
    Ok(serde_json::to_string_pretty(&analysis)?)
}

/// Register the netlist analyzer tool
pub fn register(registry: &mut ToolRegistry) {
    registry.register(analyze_schema(), Box::new(handle_analyze));
}
