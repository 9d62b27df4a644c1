//! questgrid: plan a route through a terrain map and assign boosters to the
//! events along it.

mod report;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use questgrid_core::WorldMap;
use questgrid_paths::{SearchSpace, TerrainPather, build_distance_matrix};
use questgrid_plan::{PlanConfig, plan_expedition};

use report::{MatrixTable, PlanReport};

#[derive(Parser, Debug)]
#[command(name = "questgrid", version, about = "Plan routes and booster use on terrain maps")]
struct Cli {
    /// Text map, one line per row.
    map: PathBuf,

    /// JSON planner configuration; missing fields use the stock tables.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the whole pipeline and print the plan (default).
    Plan {
        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Cheapest path between two labelled points.
    Path {
        #[arg(long)]
        from: char,
        #[arg(long)]
        to: char,
    },
    /// Print the distance matrix between all points of interest.
    Matrix,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PlanConfig> {
    let Some(path) = path else {
        return Ok(PlanConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let text = fs::read_to_string(&cli.map)
        .with_context(|| format!("reading map {}", cli.map.display()))?;
    let map = WorldMap::parse(&text, &config.symbols)
        .with_context(|| format!("parsing map {}", cli.map.display()))?;
    log::info!(
        "loaded {}x{} map with {} events",
        map.terrain.width(),
        map.terrain.height(),
        map.events.len()
    );

    match cli.command.unwrap_or(Command::Plan { json: false }) {
        Command::Plan { json } => {
            let expedition = plan_expedition(&map, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&expedition)?);
            } else {
                print!(
                    "{}",
                    PlanReport {
                        expedition: &expedition,
                        boosters: &config.boosters,
                    }
                );
            }
        }
        Command::Path { from, to } => {
            let waypoints = map.waypoints()?;
            let lookup = |label: char| {
                waypoints
                    .get(label)
                    .map(|p| p.pos)
                    .ok_or_else(|| anyhow!("no point of interest labelled '{label}'"))
            };
            let (a, b) = (lookup(from)?, lookup(to)?);

            let costs = map.marker_costs(&config.terrain);
            let pather = TerrainPather::new(map.model(&costs));
            let mut space = SearchSpace::new(map.terrain.bounds());
            let outcome = space.astar_path(&pather, a, b)?;
            if outcome.is_reachable() {
                println!(
                    "{from} {a} -> {to} {b}: cost {}, {} steps, {} nodes expanded",
                    outcome.cost,
                    outcome.steps(),
                    space.last_stats().expanded
                );
            } else {
                println!("{from} {a} -> {to} {b}: unreachable");
            }
        }
        Command::Matrix => {
            let waypoints = map.waypoints()?;
            let bounds = map.terrain.bounds();
            waypoints.check_bounds(bounds)?;
            let costs = map.marker_costs(&config.terrain);
            let pather = TerrainPather::new(map.model(&costs));
            let matrix = build_distance_matrix(&waypoints, &pather, bounds)?;
            print!("{}", MatrixTable(&matrix));
        }
    }
    Ok(())
}
