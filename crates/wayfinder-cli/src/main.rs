use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wayfinder_cli::commands::graph::{handle_graph_command, GraphCommandArgs};
use wayfinder_cli::commands::repair::handle_repair_command;
use wayfinder_cli::commands::route::{handle_route_command, parse_point, RouteCommandArgs};
use wayfinder_cli::output::OutputFormat;
use wayfinder_lib::Point3;

#[derive(Parser, Debug)]
#[command(author, version, about = "Indoor wayfinding utilities")]
struct Cli {
    /// Floor-plan JSON file describing waypoints, obstacles and settings.
    #[arg(long, global = true, default_value = "floorplan.json")]
    plan: PathBuf,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a route between two points or to a labelled office.
    Route {
        /// Start point as `x,y,z`.
        #[arg(long = "from", value_parser = parse_point, allow_hyphen_values = true)]
        from: Point3,
        /// End point as `x,y,z`.
        #[arg(
            long = "to",
            value_parser = parse_point,
            allow_hyphen_values = true,
            required_unless_present = "to_office",
            conflicts_with = "to_office"
        )]
        to: Option<Point3>,
        /// Office label to route to instead of a point.
        #[arg(long = "to-office")]
        to_office: Option<String>,
        /// Shortcut nearly-straight kinks in the planned path.
        #[arg(long)]
        smooth: bool,
        /// Route on geometry alone, ignoring hallway and office preferences.
        #[arg(long)]
        no_preferences: bool,
    },
    /// Build the waypoint graph and report its integrity.
    Graph {
        /// Inspect the neighbour lists as authored instead of rebuilding them.
        #[arg(long)]
        authored: bool,
    },
    /// Repair the authored neighbour lists and write a corrected floor plan.
    Repair {
        /// Destination for the repaired floor plan.
        #[arg(long, short)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Route {
            from,
            to,
            to_office,
            smooth,
            no_preferences,
        } => {
            let args = RouteCommandArgs {
                from,
                to,
                to_office,
                smooth,
                no_preferences,
            };
            handle_route_command(&cli.plan, cli.format, &args)
        }
        Command::Graph { authored } => {
            handle_graph_command(&cli.plan, cli.format, &GraphCommandArgs { authored })
        }
        Command::Repair { output } => handle_repair_command(&cli.plan, cli.format, &output),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
