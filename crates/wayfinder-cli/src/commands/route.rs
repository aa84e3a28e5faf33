//! Route command handler for planning walks between points or to offices.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use wayfinder_lib::{smooth, PlannerConfig, Point3, RouteSummary, SmoothingConfig};

use crate::commands::load_floor_plan;
use crate::output::{render_json, render_route_text, OutputFormat};

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    pub from: Point3,
    /// Destination point; ignored when `to_office` is set.
    pub to: Option<Point3>,
    /// Destination office label.
    pub to_office: Option<String>,
    /// Apply path smoothing.
    pub smooth: bool,
    /// Disable routing preferences.
    pub no_preferences: bool,
}

/// Parse a point given as `x,y,z`.
pub fn parse_point(value: &str) -> std::result::Result<Point3, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let &[x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got '{value}'"));
    };
    let coord = |raw: &str| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid coordinate '{raw}' in '{value}'"))
    };
    Ok(Point3::new(coord(x)?, coord(y)?, coord(z)?))
}

/// Handle the route subcommand.
pub fn handle_route_command(
    plan_path: &Path,
    format: OutputFormat,
    args: &RouteCommandArgs,
) -> Result<()> {
    let floor_plan = load_floor_plan(plan_path)?;
    let settings = floor_plan.settings();

    let config = PlannerConfig {
        preferences: if args.no_preferences {
            None
        } else {
            settings.planner.preferences
        },
        ..settings.planner
    };
    let planner = floor_plan
        .planner_with(config)
        .context("failed to build the waypoint graph")?;

    let plan = match (&args.to_office, args.to) {
        (Some(label), _) => planner
            .find_path_to_office(args.from, label)
            .with_context(|| format!("cannot route to office '{label}'"))?,
        (None, Some(to)) => planner.find_path(args.from, to),
        (None, None) => anyhow::bail!("either --to or --to-office is required"),
    };
    info!(status = %plan.status, points = plan.path.len(), "planned route");

    let summary = if args.smooth {
        let smoothing = SmoothingConfig {
            enabled: true,
            ..settings.smoothing
        };
        let smoothed = smooth(&plan.path, planner.oracle(), &smoothing);
        RouteSummary::from_path(&plan, &smoothed, &settings.turns)
    } else {
        RouteSummary::from_plan(&plan, &settings.turns)
    };

    match format {
        OutputFormat::Text => render_route_text(&summary),
        OutputFormat::Json => render_json(&summary)?,
    }
    Ok(())
}
