//! Output formatting for command results.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use wayfinder_lib::{GraphSummary, RouteRenderMode, RouteSummary};

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Render a route summary in plain text.
pub fn render_route_text(summary: &RouteSummary) {
    print!("{}", summary.render(RouteRenderMode::PlainText));
}

/// Render a graph summary in plain text.
pub fn render_graph_text(summary: &GraphSummary) {
    print!("{}", summary.render());
}

/// Render any serialisable summary in JSON format.
///
/// # Errors
///
/// Returns an error if JSON serialization or writing fails.
pub fn render_json<T: Serialize>(summary: &T) -> io::Result<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, summary).map_err(io::Error::other)?;
    stdout.write_all(b"\n")?;
    Ok(())
}
