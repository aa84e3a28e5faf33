//! Repair command handler: make authored neighbour lists consistent.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use wayfinder_lib::integrity;

use crate::commands::load_floor_plan;
use crate::output::{render_json, OutputFormat};

#[derive(Debug, Serialize)]
struct RepairSummary<'a> {
    findings: usize,
    nodes: usize,
    edges: usize,
    output: &'a Path,
}

/// Handle the repair subcommand.
pub fn handle_repair_command(plan_path: &Path, format: OutputFormat, output: &Path) -> Result<()> {
    let floor_plan = load_floor_plan(plan_path)?;
    let authored = floor_plan
        .authored_graph()
        .context("failed to read authored neighbour lists")?;

    let findings = integrity::report(&authored);
    let repaired = integrity::repair(&authored).context("failed to repair neighbour lists")?;

    floor_plan
        .with_graph(&repaired)
        .save(output)
        .with_context(|| format!("failed to write repaired floor plan to {}", output.display()))?;

    let summary = RepairSummary {
        findings: findings.finding_count(),
        nodes: repaired.len(),
        edges: repaired.edge_count(),
        output,
    };
    match format {
        OutputFormat::Text => println!(
            "Repaired {} finding(s); {} nodes, {} edges written to {}",
            summary.findings,
            summary.nodes,
            summary.edges,
            output.display()
        ),
        OutputFormat::Json => render_json(&summary)?,
    }
    Ok(())
}
