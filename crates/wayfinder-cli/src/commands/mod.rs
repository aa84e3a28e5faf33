// Module exports for CLI subcommands
//
// Each module handles one subcommand; main.rs only parses arguments and
// dispatches here.

pub mod graph;
pub mod repair;
pub mod route;

use std::path::Path;

use anyhow::{Context, Result};

use wayfinder_lib::FloorPlan;

/// Load and validate the floor plan named by `--plan`.
pub fn load_floor_plan(path: &Path) -> Result<FloorPlan> {
    FloorPlan::from_path(path)
        .with_context(|| format!("failed to load floor plan from {}", path.display()))
}
