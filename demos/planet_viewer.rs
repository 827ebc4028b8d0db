//! Planet Viewer
//!
//! Opens a window showing a point cloud around a planet sphere. Points come
//! from a JSON or text asset, or from a synthetic shell when none is given.
//!
//! Controls:
//!   Left drag: orbit
//!   Right drag: pan (when enabled in the configuration)
//!   Scroll: zoom
//!   Left click: highlight the point under the cursor
//!   R: reset the camera
//!
//! Run with `RUST_LOG=debug` to see every ray and its intersections.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use pointpick_core::PointDataset;
use pointpick_gpu::StrategyKind;
use pointpick_io::{load_dataset, planet_shell};
use pointpick_visualization::{InteractiveViewer, ViewerConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    /// Squares of a fixed pixel size
    Fixed,
    /// Soft discs that grow as they approach the camera
    DepthScaled,
}

impl From<Strategy> for StrategyKind {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Fixed => StrategyKind::Fixed,
            Strategy::DepthScaled => StrategyKind::DepthScaled,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "planet_viewer", about = "Interactive point cloud viewer with point picking")]
struct Args {
    /// Position asset (.json, .xyz, .txt or .csv)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Viewer settings in TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Point rendering strategy; overrides the configuration
    #[arg(short, long, value_enum)]
    strategy: Option<Strategy>,

    /// Picking threshold in world units; overrides the configuration
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Points in the synthetic shell used without an input asset
    #[arg(long, default_value_t = 5000)]
    points: usize,

    /// Hide the planet sphere
    #[arg(long)]
    no_planet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config.render.strategy = strategy.into();
    }
    if let Some(threshold) = args.threshold {
        config.picking.threshold = threshold;
    }
    if args.no_planet {
        config.planet.enabled = false;
    }

    let dataset = match &args.input {
        Some(path) => load_dataset(path).with_context(|| format!("loading {}", path.display()))?,
        None => {
            log::info!("No input given, generating a shell of {} points", args.points);
            let radius = config.planet.radius * 1.5;
            PointDataset::load(planet_shell(args.points, radius, 0.05 * radius, 7))?
        }
    };

    InteractiveViewer::new(dataset, config).run()?;
    Ok(())
}
