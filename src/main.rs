//! Headless site simulator
//!
//! Builds a site map from the command line, runs one simulation and prints
//! the outcome as a text summary or a JSON report.
//!
//! ```text
//! site_sim --place good-cult@0,0 --place spike-field@3,3 --phase 5
//! site_sim --place danger-sign@2,2 --buff visibility_bonus=1.5 --years 10000 --format json
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use place_of_honor::core::error::{ConfigurationError, Result};
use place_of_honor::core::types::Position;
use place_of_honor::core::{set_config, SimulationConfig};
use place_of_honor::simulation::{derive_seed, phase_duration, run_simulation_seeded};
use place_of_honor::{GlobalBuffs, MarkerCatalog, SiteMap};

/// Headless Site Simulator - test a marker layout against future societies
#[derive(Parser, Debug)]
#[command(name = "site_sim")]
#[command(about = "Simulate whether future societies breach a marked nuclear-waste site")]
struct Args {
    /// Map width in cells
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Map height in cells
    #[arg(long, default_value_t = 8)]
    height: usize,

    /// Place a marker: key@row,col (repeatable)
    #[arg(long = "place", value_parser = parse_placement)]
    placements: Vec<(String, Position)>,

    /// Global buff: id=magnitude, e.g. visibility_bonus=2 (repeatable)
    #[arg(long = "buff", value_parser = parse_buff)]
    buffs: Vec<(String, f32)>,

    /// Leave the core tiles off the map (the central block is still the core)
    #[arg(long)]
    no_core_markers: bool,

    /// Years to simulate
    #[arg(long, conflicts_with = "phase")]
    years: Option<u32>,

    /// Campaign phase to simulate (phase n covers n * 400 years)
    #[arg(long, default_value_t = 1)]
    phase: u32,

    /// Random seed (derived from the map and buffs when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation config TOML layered over the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,

    /// Write the JSON report to this file as well
    #[arg(long)]
    output: Option<PathBuf>,

    /// List purchasable markers and exit
    #[arg(long)]
    list_markers: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("place_of_honor=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list_markers {
        let catalog = MarkerCatalog::builtin()?;
        for key in catalog.purchasable_keys() {
            let marker = catalog.get(key)?;
            println!("{:<24} {:>9}  {}", key, marker.base_cost, marker.name);
        }
        return Ok(());
    }

    if let Some(path) = &args.config {
        let content = std::fs::read_to_string(path)?;
        let config = SimulationConfig::from_toml_str(&content)?;
        if set_config(config).is_err() {
            tracing::warn!("Simulation config was already initialised; ignoring {}", path.display());
        }
    }

    let mut map = if args.no_core_markers {
        SiteMap::new(args.width, args.height)
    } else {
        SiteMap::with_core_markers(args.width, args.height)?
    };
    for (key, pos) in &args.placements {
        map.place(*pos, key)?;
    }
    let buffs = GlobalBuffs::from_pairs(args.buffs.iter().cloned())?;

    let years = args.years.unwrap_or_else(|| phase_duration(args.phase));
    let seed = args.seed.unwrap_or_else(|| derive_seed(years, &map, &buffs));

    tracing::info!(
        width = args.width,
        height = args.height,
        markers = map.cell_count(),
        years,
        "Running site simulation"
    );

    let report = run_simulation_seeded(years, &map, &buffs, seed)?;

    match args.format.as_str() {
        "json" => println!("{}", report.to_json()?),
        "text" => println!("{}", report.summary()),
        other => {
            return Err(ConfigurationError::InvalidConfig(format!(
                "unknown output format '{}' (expected text or json)",
                other
            ))
            .into())
        }
    }

    if let Some(path) = &args.output {
        std::fs::write(path, report.to_json()?)?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

fn parse_placement(s: &str) -> std::result::Result<(String, Position), String> {
    let (key, coords) = s
        .split_once('@')
        .ok_or_else(|| format!("expected key@row,col, got '{}'", s))?;
    let (row, col) = coords
        .split_once(',')
        .ok_or_else(|| format!("expected row,col after '@', got '{}'", coords))?;
    let row = row.trim().parse::<usize>().map_err(|e| format!("bad row '{}': {}", row, e))?;
    let col = col.trim().parse::<usize>().map_err(|e| format!("bad column '{}': {}", col, e))?;
    Ok((key.trim().to_string(), Position::new(row, col)))
}

fn parse_buff(s: &str) -> std::result::Result<(String, f32), String> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected id=magnitude, got '{}'", s))?;
    let magnitude = value
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("bad magnitude '{}': {}", value, e))?;
    Ok((id.trim().to_string(), magnitude))
}
