//! Scatter Viewer - synchronized 2D/3D scatter plots with two image slots
//!
//! CLI commands:
//! - gui: Launch the native viewer (default)
//! - list: List the dataset's series
//! - export: Write the renderer outputs (traces, layouts, config) as JSON
//! - replay: Apply a YAML script of viewer actions headlessly

mod config;
mod dataset;
mod export;
mod gui;
mod images;
mod layout;
mod logging;
mod marker;
mod pick;
mod projection;
mod replay;
mod selection;
mod state;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::selection::Slot;

#[derive(Parser)]
#[command(name = "scatter_viewer")]
#[command(about = "Synchronized 2D/3D scatter plots with side-by-side image slots")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to viewer.yaml config
    #[arg(short, long, default_value = "viewer.yaml")]
    config: PathBuf,

    /// Dataset JSON document (falls back to $DATASET, then the built-in demo)
    #[arg(short, long)]
    dataset: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch native GUI viewer
    Gui,

    /// List the dataset's series
    List,

    /// Write data traces, layouts and plot config as JSON
    Export {
        /// Output file
        #[arg(short, long, default_value = "render.json")]
        output: PathBuf,
    },

    /// Apply a YAML action script to a fresh viewer state
    Replay {
        /// Script file
        script: PathBuf,

        /// Also export the final renderer outputs to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let env = config::Env::load();

    // Initialize logging first
    logging::init_logging(&env.log_dir)?;
    tracing::info!("Scatter Viewer starting up");

    let cli = Cli::parse();
    tracing::debug!("CLI args parsed: config={:?} dataset={:?}", cli.config, cli.dataset);

    let config = if cli.config.exists() {
        tracing::info!("Loading config from {:?}", cli.config);
        config::Config::load(&cli.config)?
    } else {
        tracing::warn!("Config file not found: {:?}, using defaults", cli.config);
        config::Config::default()
    };
    let config = config.with_env(&env);
    tracing::info!("Config loaded: static_base={}", config.static_base);

    let dataset = match cli.dataset.as_ref().or(env.dataset.as_ref()) {
        Some(path) => load_dataset(path, &config)?,
        None => {
            tracing::info!("No dataset given, using built-in demo data");
            dataset::Dataset::builtin(&config)
        }
    };

    let mut viewer = state::ViewerState::new(dataset, &config);

    match cli.command.unwrap_or(Commands::Gui) {
        Commands::Gui => {
            tracing::info!("Launching native GUI viewer");
            gui::run_viewer(viewer)?;
        }

        Commands::List => {
            list_series(&viewer);
        }

        Commands::Export { output } => {
            export::write(&viewer, &output)?;
            println!("Wrote {:?}", output);
        }

        Commands::Replay { script, export } => {
            let steps = replay::load(&script)?;
            tracing::info!("Replaying {} steps from {:?}", steps.len(), script);
            let results = replay::run(&mut viewer, &steps);

            for r in &results {
                match &r.outcome {
                    Ok(t) => println!("  [OK]   #{} {:?}", r.index, t),
                    Err(e) => println!("  [FAIL] #{} {}", r.index, e),
                }
            }
            print_summary(&viewer);

            if let Some(path) = export {
                export::write(&viewer, &path)?;
            }
        }
    }

    Ok(())
}

fn load_dataset(path: &Path, config: &config::Config) -> anyhow::Result<dataset::Dataset> {
    tracing::info!("Loading dataset from {:?}", path);
    let dataset = dataset::Dataset::load(path, config)?;
    tracing::info!(
        "Dataset loaded: {} series, {} points",
        dataset.series().len(),
        dataset.total_points()
    );
    Ok(dataset)
}

/// List series with their color and point count
fn list_series(viewer: &state::ViewerState) {
    let series = viewer.dataset().series();
    println!("Series ({}):", series.len());
    println!();
    for (i, s) in series.iter().enumerate() {
        println!("  [{}] {} {} ({} points)", i, s.color, s.name, s.len());
    }
}

fn print_summary(viewer: &state::ViewerState) {
    println!();
    println!("Active slot: {}", viewer.active_slot());
    for slot in Slot::ALL {
        let s = viewer.slot(slot);
        match s.selection {
            Some(p) => println!("  {:<5} point {} -> {}", slot.as_str(), p, s.image_url),
            None => println!("  {:<5} (empty) -> {}", slot.as_str(), s.image_url),
        }
    }
    println!("Highlighted points: {}", viewer.markers().highlighted_count());
    println!(
        "Revisions: 2D={} 3D={}",
        viewer.layout_2d().revision,
        viewer.layout_3d().revision
    );
}
