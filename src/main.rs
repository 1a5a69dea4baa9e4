//! Profiler Viz - visualization data pipelines for dataset profiling
//!
//! CLI commands:
//! - scatter: Build 3D scatter plot data from coordinate/label text
//! - heatmap: Build similarity heatmap data from `row,col,value` CSV
//! - fetch: Download raw profiling texts from the profiler server
//! - list: List configured dataset collections

mod color;
mod config;
mod fetch;
mod heatmap;
mod logging;
mod scatter;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use heatmap::{ColorScale, SimilarityMatrix};
use scatter::ColorMode;

#[derive(Parser)]
#[command(name = "profiler_viz")]
#[command(about = "Scatter and heatmap data from dataset-profiling results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to datasets.yaml config
    #[arg(short, long, default_value = "datasets.yaml")]
    config: PathBuf,
}

/// Point coloring strategy for the scatter command
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum ColorBy {
    /// No coloring (and reset any previous coloring)
    None,
    /// Color each point by its own normalized position
    Position,
    /// Color points by a `label:value` score file (requires --scores)
    Scores,
}

#[derive(Subcommand)]
enum Commands {
    /// Build 3D scatter plot data for the renderer
    Scatter {
        /// Coordinate text: up to 3 comma-separated floats per row
        #[arg(long)]
        coordinates: PathBuf,

        /// Label text, row-aligned with the coordinates
        #[arg(long)]
        labels: PathBuf,

        /// Score text (`label:value` rows) for --color scores
        #[arg(long)]
        scores: Option<PathBuf>,

        /// Coloring strategy
        #[arg(long, value_enum, default_value = "none")]
        color: ColorBy,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Build similarity heatmap data for the renderer
    Heatmap {
        /// Similarity CSV: header line + `row,col,value` lines
        #[arg(long)]
        matrix: PathBuf,

        /// Reorder rows/columns by descending similarity to this label
        #[arg(long)]
        pivot: Option<String>,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Download raw profiling texts from configured sources
    Fetch {
        /// Fetch a specific dataset collection by ID
        #[arg(long)]
        dataset: Option<String>,

        /// Fetch all configured collections
        #[arg(long)]
        all: bool,
    },

    /// List configured dataset collections
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    logging::init_logging("logs");
    tracing::info!("Profiler Viz starting up");

    let cli = Cli::parse();
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    // Load config
    let config = if cli.config.exists() {
        tracing::info!("Loading config from {:?}", cli.config);
        config::Config::load(&cli.config)?
    } else {
        tracing::warn!("Config file not found: {:?}, using defaults", cli.config);
        default_config()
    };
    tracing::info!("Config loaded: {} dataset collections", config.datasets.len());

    // Load secrets
    let secrets = config::Secrets::load();

    match cli.command {
        Commands::Scatter {
            coordinates,
            labels,
            scores,
            color,
            output,
        } => {
            build_scatter(&coordinates, &labels, scores.as_deref(), color, &output)?;
        }

        Commands::Heatmap {
            matrix,
            pivot,
            output,
        } => {
            build_heatmap(&matrix, pivot.as_deref(), &output)?;
        }

        Commands::Fetch { dataset, all } => {
            if all {
                fetch_all(&config, &secrets).await?;
            } else if let Some(id) = dataset {
                fetch_dataset(&config, &id, &secrets).await?;
            } else {
                println!("Specify --dataset or --all");
            }
        }

        Commands::List => {
            list_datasets(&config);
        }
    }

    Ok(())
}

/// Build scatter plot data: parse, scan extrema, colorize, write JSON
fn build_scatter(
    coordinates: &Path,
    labels: &Path,
    scores: Option<&Path>,
    color: ColorBy,
    output: &Path,
) -> Result<()> {
    let coordinate_text = std::fs::read_to_string(coordinates)?;
    let label_text = std::fs::read_to_string(labels)?;

    let mut points = scatter::parse_points(&coordinate_text, &label_text);
    tracing::info!("Parsed {} points from {:?}", points.len(), coordinates);

    let extrema = scatter::compute_extrema(&points);
    if extrema.is_none() {
        tracing::warn!("No points parsed; writing empty scatter document");
    }

    let mode = match color {
        ColorBy::None => ColorMode::None,
        ColorBy::Position => ColorMode::ByPosition,
        ColorBy::Scores => {
            let path = scores
                .ok_or_else(|| anyhow::anyhow!("--color scores requires --scores <FILE>"))?;
            let score_text = std::fs::read_to_string(path)?;
            ColorMode::ByScores(scatter::parse_scores(&score_text))
        }
    };
    let legend = scatter::apply_color_mode(&mut points, &mode, extrema.as_ref());

    let count = points.len();
    let document = serde_json::json!({
        "points": points,
        "extrema": extrema,
        "legend": legend,
    });
    std::fs::write(output, serde_json::to_string_pretty(&document)?)?;
    println!("Wrote {} points to {:?}", count, output);

    Ok(())
}

/// Build heatmap data: parse, reorder, project, attach the color scale
fn build_heatmap(matrix: &Path, pivot: Option<&str>, output: &Path) -> Result<()> {
    let csv = std::fs::read_to_string(matrix)?;

    let similarities = SimilarityMatrix::parse(&csv);
    tracing::info!(
        "Parsed similarity matrix with {} labels from {:?}",
        similarities.labels().len(),
        matrix
    );

    let ordered = similarities.reorder(pivot.unwrap_or(""));
    let cells = similarities.project(&ordered);
    let min = similarities.global_min();
    let scale = ColorScale::from_min(min);

    let side = ordered.len();
    let document = serde_json::json!({
        "labels": ordered,
        "cells": cells,
        "min": min,
        "scale": scale,
    });
    std::fs::write(output, serde_json::to_string_pretty(&document)?)?;
    println!("Wrote {}x{} heatmap cells to {:?}", side, side, output);

    Ok(())
}

/// Fetch all configured dataset collections
async fn fetch_all(config: &config::Config, secrets: &config::Secrets) -> Result<()> {
    println!("Fetching {} dataset collections...", config.datasets.len());

    for source in &config.datasets {
        match fetch_source(source, secrets).await {
            Ok(()) => println!("  [OK] {}", source.name),
            Err(e) => println!("  [FAIL] {}: {}", source.name, e),
        }

        // Be gentle with the profiler server
        tokio::time::sleep(tokio::time::Duration::from_millis(300)).await;
    }

    println!("Fetch complete!");
    Ok(())
}

/// Fetch a single dataset collection by ID
async fn fetch_dataset(config: &config::Config, id: &str, secrets: &config::Secrets) -> Result<()> {
    let source = config
        .get_dataset(id)
        .ok_or_else(|| anyhow::anyhow!("Dataset collection not found: {}", id))?;

    println!("Fetching: {}", source.name);
    fetch_source(source, secrets).await
}

/// Fetch the four raw texts of one collection into DATA_DIR/<id>/
async fn fetch_source(source: &config::DatasetSource, secrets: &config::Secrets) -> Result<()> {
    let dir = PathBuf::from(&secrets.data_dir).join(&source.id);

    fetch::fetch_to_file(&source.coordinates_url, &dir, "coordinates.txt").await?;
    fetch::fetch_to_file(&source.labels_url, &dir, "labels.txt").await?;
    fetch::fetch_to_file(&source.similarity_url, &dir, "similarity.csv").await?;

    for (set, location) in &source.scores {
        let url = if location.starts_with("http") {
            location.clone()
        } else if let Some(base) = &secrets.profiler_base {
            fetch::score_url(base, location)
        } else {
            tracing::warn!(
                "Score set '{}' is not a URL and PROFILER_BASE is unset, skipping",
                set
            );
            continue;
        };
        fetch::fetch_to_file(&url, &dir, &format!("scores-{}.txt", set)).await?;
    }

    Ok(())
}

/// List configured dataset collections
fn list_datasets(config: &config::Config) {
    println!("Configured dataset collections ({}):", config.datasets.len());
    println!();

    for source in &config.datasets {
        println!("  - {} [{}]", source.name, source.id);
        println!("      coordinates: {}", source.coordinates_url);
        println!("      labels:      {}", source.labels_url);
        println!("      similarity:  {}", source.similarity_url);
        for (set, url) in &source.scores {
            println!("      scores/{}: {}", set, url);
        }
    }
}

/// Default config when no file exists
fn default_config() -> config::Config {
    use std::collections::HashMap;

    let mut scores = HashMap::new();
    scores.insert(
        "accuracy".to_string(),
        "http://localhost:8080/scores/accuracy/text".to_string(),
    );

    config::Config {
        datasets: vec![config::DatasetSource {
            id: "default".to_string(),
            name: "Default profiling run".to_string(),
            coordinates_url: "http://localhost:8080/mds/coords".to_string(),
            labels_url: "http://localhost:8080/mds/labels".to_string(),
            similarity_url: "http://localhost:8080/sm/csv".to_string(),
            scores,
        }],
    }
}
