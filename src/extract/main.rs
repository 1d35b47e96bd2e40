//! Pub extraction.
//!
//! Reads an OSM PBF or XML file, keeps the entities tagged with the configured
//! category, and writes them as JSON partitions of 0.01 x 0.01 square degrees.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pubgrid::config::Config;
use pubgrid::pipeline::extract_file;

#[derive(Parser, Debug)]
#[command(name = "extract")]
#[command(about = "Extract pubs from an OpenStreetMap file into grid partitions")]
struct Args {
    /// OSM file to read (.osm for XML, anything else is read as PBF)
    osm_file: PathBuf,

    /// Existing directory that receives one <lat>x<lon>.json file per cell
    out_dir: PathBuf,

    /// Optional TOML config file with a [filter] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tag key to match (default: amenity)
    #[arg(long)]
    key: Option<String>,

    /// Tag value to match (default: pub)
    #[arg(long)]
    value: Option<String>,

    /// Hide the progress spinner
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    let filter = config.poi_filter(args.key.as_deref(), args.value.as_deref());

    info!("pubgrid extract");
    info!("File: {}", args.osm_file.display());
    info!("Output: {}", args.out_dir.display());
    info!("Filter: {}", filter);

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} entities ({per_sec})")?,
        );
        pb
    };

    let summary = extract_file(&args.osm_file, &args.out_dir, &filter, &pb)
        .with_context(|| format!("Failed to extract {}", args.osm_file.display()))?;

    pb.finish_and_clear();

    info!(
        "Wrote {} records into {} partitions ({} entities read)",
        summary.records(),
        summary.partitions,
        summary.entities
    );

    Ok(())
}
