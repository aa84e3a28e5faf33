//! Graph command handler: connectivity counts and integrity findings.

use std::path::Path;

use anyhow::{Context, Result};

use wayfinder_lib::integrity;
use wayfinder_lib::GraphSummary;

use crate::commands::load_floor_plan;
use crate::output::{render_graph_text, render_json, OutputFormat};

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphCommandArgs {
    /// Inspect the authored neighbour lists rather than a rebuilt graph.
    pub authored: bool,
}

/// Handle the graph subcommand.
pub fn handle_graph_command(
    plan_path: &Path,
    format: OutputFormat,
    args: &GraphCommandArgs,
) -> Result<()> {
    let floor_plan = load_floor_plan(plan_path)?;
    let graph = if args.authored {
        floor_plan.authored_graph()
    } else {
        floor_plan.build_graph()
    }
    .context("failed to build the waypoint graph")?;

    let summary = GraphSummary::new(&graph, integrity::report(&graph));
    match format {
        OutputFormat::Text => render_graph_text(&summary),
        OutputFormat::Json => render_json(&summary)?,
    }
    Ok(())
}
