use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod output;
mod validate;

use output::write_dataset;
use sitp_transit::compiler::{compile, load_gtfs};
use validate::validate_dir;

#[derive(Parser, Debug)]
#[command(
    name = "gtfs-prep",
    author,
    version,
    about = "Compile a GTFS feed into the static route map dataset",
    long_about = "Reads a GTFS feed (zip archive or extracted directory) and writes the files \
                  the route map viewer loads: one GeoJSON file per route, all_routes.geojson, \
                  routes_index.json, stops_with_routes.json, stops.geojson, routes_to_stops.json \
                  and route_frequencies.json.\n\n\
                  The validate subcommand checks an existing dataset directory."
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a GTFS feed into a dataset directory
    Build {
        /// GTFS zip archive or extracted directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for the dataset files
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check that every per-route file is a FeatureCollection of route lines
    Validate {
        /// Dataset directory to check
        #[arg(short, long)]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    match args.command {
        Command::Build { input, output } => build(input, output),
        Command::Validate { dir } => validate(dir),
    }
}

fn build(input: PathBuf, output: PathBuf) -> Result<()> {
    log::info!("=== GTFS Dataset Builder ===");
    log::info!("Input: {}", input.display());
    log::info!("Output: {}", output.display());

    if !input.exists() {
        bail!("Input feed does not exist: {}", input.display());
    }

    log::info!("");
    log::info!("Phase 1: Reading GTFS feed...");
    let gtfs = load_gtfs(&input).with_context(|| format!("Failed to read GTFS feed {}", input.display()))?;
    log::info!(
        "  {} routes, {} trips, {} shapes, {} stops",
        gtfs.routes.len(),
        gtfs.trips.len(),
        gtfs.shapes.len(),
        gtfs.stops.len()
    );

    log::info!("");
    log::info!("Phase 2: Compiling routes, stops and frequencies...");
    let dataset = compile(&gtfs);
    log::info!(
        "  {} routes with {} shapes, {} stops",
        dataset.routes.len(),
        dataset.shape_count(),
        dataset.stops.len()
    );
    if dataset.routes.is_empty() {
        log::warn!("  No route has shape geometry; the map will be empty");
    }

    log::info!("");
    log::info!("Phase 3: Writing dataset...");
    let stats = write_dataset(&dataset, &output).context("Failed to write dataset")?;

    log::info!("");
    stats.log_summary();
    log::info!("Done");
    Ok(())
}

fn validate(dir: PathBuf) -> Result<()> {
    log::info!("=== GTFS Dataset Validator ===");
    log::info!("Directory: {}", dir.display());

    let report = validate_dir(&dir)?;

    log::info!("");
    log::info!("=== Summary ===");
    log::info!("  Files checked:    {}", report.files_checked);
    log::info!("  Features checked: {}", report.features_checked);
    log::info!("  Empty files:      {}", report.empty_files.len());
    log::info!("  Problems:         {}", report.problems.len());

    if !report.is_valid() {
        for problem in &report.problems {
            log::error!("  {}", problem);
        }
        bail!("{} problems found in {}", report.problems.len(), dir.display());
    }

    log::info!("All route files valid");
    Ok(())
}
