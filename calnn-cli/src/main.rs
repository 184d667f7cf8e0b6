//! calnn: command-line driver for nearest-neighbor calorimeter clustering.
//!
//! Reads hit events from JSON, clusters each event, and reports the
//! clusters and residual hits as JSON.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::needless_pass_by_value
)]

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use calnn_algorithms::{cluster_events, EventClusters, NnClustering};
use calnn_core::{
    hit_map, CalHit, CellId, ClusteringStatistics, GridNeighbors, Hit, HitMap, LinearNeighbors,
    NeighborProvider, NeighborWindow, NnConfig,
};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] calnn_core::Error),
}

/// Detector segmentation used for neighbor lookup.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Geometry {
    /// Consecutively numbered strip of cells
    Linear,
    /// Layered cartesian grid (layer << 32 | u << 16 | v)
    Grid,
}

/// Nearest-neighbor clustering of calorimeter hits.
#[derive(Parser)]
#[command(name = "calnn")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster every event of a JSON hit file
    Cluster {
        /// Input JSON file
        input: PathBuf,

        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum summed value of a kept cluster
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        min_value: f64,

        /// Neighbor reach across layers
        #[arg(long, default_value = "1")]
        delta_layer: u32,

        /// Neighbor reach along u
        #[arg(long, default_value = "1")]
        delta_u: u32,

        /// Neighbor reach along v
        #[arg(long, default_value = "1")]
        delta_v: u32,

        /// Cell id segmentation
        #[arg(short, long, value_enum, default_value = "linear")]
        geometry: Geometry,

        /// Number of layers for the grid segmentation
        #[arg(long, default_value = "64")]
        layers: u32,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a JSON hit file
    Info {
        /// Input JSON file
        input: PathBuf,
    },
}

/// Input document: a list of independent events.
#[derive(Debug, Serialize, Deserialize)]
struct EventFile {
    events: Vec<EventRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EventRecord {
    hits: Vec<CalHit>,
}

#[derive(Debug, Serialize)]
struct Report {
    clusterer: String,
    config: NnConfig,
    events: Vec<EventReport>,
}

#[derive(Debug, Serialize)]
struct EventReport {
    index: usize,
    clusters: Vec<ClusterReport>,
    residual: Vec<CellId>,
    statistics: ClusteringStatistics,
}

#[derive(Debug, Serialize)]
struct ClusterReport {
    value: f64,
    size: usize,
    highest: Option<CellId>,
    cells: Vec<CellId>,
}

fn load_events(path: &Path) -> Result<Vec<HitMap<CalHit>>> {
    let reader = BufReader::new(File::open(path)?);
    let file: EventFile = serde_json::from_reader(reader)?;
    Ok(file
        .events
        .into_iter()
        .map(|event| hit_map(event.hits))
        .collect())
}

fn neighbor_provider(geometry: Geometry, layers: u32) -> Result<Box<dyn NeighborProvider>> {
    Ok(match geometry {
        Geometry::Linear => Box::new(LinearNeighbors),
        Geometry::Grid => Box::new(GridNeighbors::new(layers)?),
    })
}

fn event_report(
    index: usize,
    result: EventClusters<CalHit>,
    residual: &HitMap<CalHit>,
) -> EventReport {
    let clusters = result
        .clusters
        .iter()
        .map(|cluster| ClusterReport {
            value: cluster.value(),
            size: cluster.len(),
            highest: cluster.highest().map(|cell| cell.id()),
            cells: cluster.hits().iter().map(Hit::cell_id).collect(),
        })
        .collect();
    let mut residual: Vec<CellId> = residual.keys().copied().collect();
    residual.sort_unstable();

    EventReport {
        index,
        clusters,
        residual,
        statistics: result.statistics,
    }
}

fn cluster_file(
    input: &Path,
    config: &NnConfig,
    neighbors: &dyn NeighborProvider,
) -> Result<Report> {
    let mut events = load_events(input)?;
    info!("loaded {} events from {}", events.len(), input.display());

    let results = cluster_events(&mut events, neighbors, config)?;
    let reports = results
        .into_iter()
        .zip(&events)
        .enumerate()
        .map(|(index, (result, residual))| event_report(index, result, residual))
        .collect();

    Ok(Report {
        clusterer: NnClustering::new(*config).to_string(),
        config: *config,
        events: reports,
    })
}

fn write_report(report: &Report, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, report)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, report)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Cluster {
            input,
            output,
            min_value,
            delta_layer,
            delta_u,
            delta_v,
            geometry,
            layers,
            verbose,
        } => {
            init_logging(verbose);

            let config = NnConfig::new()
                .with_min_value(min_value)
                .with_window(NeighborWindow::new(delta_layer, delta_u, delta_v));
            debug!("geometry: {:?}, config: {:?}", geometry, config);

            let neighbors = neighbor_provider(geometry, layers)?;
            let start = Instant::now();
            let report = cluster_file(&input, &config, neighbors.as_ref())?;

            let clusters: usize = report.events.iter().map(|e| e.clusters.len()).sum();
            info!(
                "{} clusters in {} events ({:.2?})",
                clusters,
                report.events.len(),
                start.elapsed()
            );

            write_report(&report, output.as_deref())?;
        }
        Commands::Info { input } => {
            init_logging(false);

            let events = load_events(&input)?;
            let hits: usize = events.iter().map(|event| event.len()).sum();
            let energy: f64 = events
                .iter()
                .flat_map(|event| event.values())
                .map(Hit::value)
                .sum();

            println!("File: {}", input.display());
            println!("Events: {}", events.len());
            println!("Hits: {}", hits);
            println!("Total energy: {:.4}", energy);
            if !events.is_empty() {
                println!("Mean hits/event: {:.2}", hits as f64 / events.len() as f64);
            }
        }
    }

    Ok(())
}
