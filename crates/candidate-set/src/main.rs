//! Candidate Set Builder CLI
//!
//! Merges ground nodes and cable landing points into the deduplicated,
//! zone-tagged candidate universe for the 247 station down-selection.
//!
//! Usage:
//!   build-candidate-set --ground-nodes data/all_ground_nodes_backup.json \
//!                       --cable-landings data/cable-infrastructure/cable_landing_complete.json \
//!                       --output data/candidate_set.json

use anyhow::Result;
use candidate_set::{export, pipeline, summary, PipelineConfig};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "build-candidate-set",
    about = "Build the deduplicated ground station candidate set for SX9-Orbital"
)]
struct Args {
    /// Path to ground nodes JSON file
    #[arg(short = 'g', long, default_value = "data/all_ground_nodes_backup.json")]
    ground_nodes: PathBuf,

    /// Path to cable landings JSON file
    #[arg(
        short = 'c',
        long,
        default_value = "data/cable-infrastructure/cable_landing_complete.json"
    )]
    cable_landings: PathBuf,

    /// Output JSON file
    #[arg(short, long, default_value = "data/candidate_set.json")]
    output: PathBuf,

    /// Pipeline config (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Deduplication threshold in km (overrides config)
    #[arg(long)]
    threshold_km: Option<f64>,

    /// Drop records with out-of-range coordinates
    #[arg(long)]
    strict_coordinates: bool,

    /// Also output GeoJSON
    #[arg(long)]
    geojson: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("Building Ground Station Candidate Set");
    info!("{}", "=".repeat(60));

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(km) = args.threshold_km {
        config = config.with_threshold_km(km);
    }
    if args.strict_coordinates {
        config.strict_coordinates = true;
    }

    let set = pipeline::load_candidate_set(&args.ground_nodes, &args.cable_landings, &config)?;

    // Zone summary
    info!("\nZone distribution:");
    for z in &set.summary.zones {
        info!("  {}: {} candidates (quota: {})", z.zone, z.count, z.quota);
    }

    // Write output
    info!("\nWriting output to {:?}", args.output);
    let file = File::create(&args.output)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &set)?;

    // Write GeoJSON if requested
    if args.geojson {
        let geojson_path = args.output.with_extension("geojson");
        info!("Writing GeoJSON to {:?}", geojson_path);
        let geojson = export::to_geojson(&set)?;
        let file = File::create(&geojson_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &geojson)?;
    }

    info!("  {} unique candidate locations", set.metadata.total_candidates);

    info!("\nTop 10 candidates by cable count:");
    for c in summary::top_by_cable_count(&set.candidates, 10) {
        let name: String = c.name.chars().take(40).collect();
        info!("  {:3} cables | {:40} | {}", c.cable_count.unwrap_or(0), name, c.zone);
    }

    Ok(())
}
