//! Lookups over a directory of partition files.
//!
//! Either a bounding box (`--south-west`/`--north-east`) or a radius around a
//! point (`--near`/`--radius`). Matching records are printed as a JSON array
//! on stdout; radius results are nearest first and carry their distance.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pubgrid::partition::{read_box, read_near};
use pubgrid::Coordinate;

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "List extracted points inside a bounding box or near a point")]
struct Args {
    /// Directory written by `extract`
    dir: PathBuf,

    /// South-west corner as LAT,LON
    #[arg(long, allow_hyphen_values = true, requires = "north_east")]
    south_west: Option<Coordinate>,

    /// North-east corner as LAT,LON
    #[arg(long, allow_hyphen_values = true, requires = "south_west")]
    north_east: Option<Coordinate>,

    /// Center of a radius search as LAT,LON
    #[arg(
        long,
        allow_hyphen_values = true,
        conflicts_with_all = ["south_west", "north_east"]
    )]
    near: Option<Coordinate>,

    /// Search radius in meters (with --near)
    #[arg(long, default_value_t = 1000.0)]
    radius: f64,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

fn print_json<T: Serialize>(records: &[T], pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    println!("{}", out);
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    if !args.dir.is_dir() {
        anyhow::bail!("{} is not a directory", args.dir.display());
    }

    match (args.near, args.south_west, args.north_east) {
        (Some(origin), _, _) => {
            let records = read_near(&args.dir, origin, args.radius)
                .context("Failed to read partitions")?;
            info!("Found {} records within {} m of {}", records.len(), args.radius, origin);
            print_json(&records, args.pretty)
        }
        (None, Some(south_west), Some(north_east)) => {
            let records = read_box(&args.dir, south_west, north_east)
                .context("Failed to read partitions")?;
            info!("Found {} records", records.len());
            print_json(&records, args.pretty)
        }
        _ => anyhow::bail!("pass either --near or both --south-west and --north-east"),
    }
}
