//! Headless Picking
//!
//! Replays a list of clicks against a point cloud without opening a window
//! and prints what each click selected. Useful to check thresholds and
//! camera settings for an asset.
//!
//!   pick_headless --click 640,400 --click 10,10 --input points.json

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use pointpick_core::PointDataset;
use pointpick_io::{load_dataset, planet_shell};
use pointpick_picking::Viewport;
use pointpick_visualization::{handle_click, CanvasBounds, ViewerConfig, ViewerState};

#[derive(Debug, Parser)]
#[command(name = "pick_headless", about = "Replay clicks against a point cloud")]
struct Args {
    /// Position asset (.json, .xyz, .txt or .csv)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Viewer settings in TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Click position `x,y` in pixels; repeatable. Defaults to the center
    #[arg(long = "click", value_parser = parse_click)]
    clicks: Vec<(f32, f32)>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,
}

fn parse_click(value: &str) -> Result<(f32, f32), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got '{}'", value))?;
    let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if args.width == 0 || args.height == 0 {
        bail!("viewport must not be empty, got {}x{}", args.width, args.height);
    }

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    let dataset = match &args.input {
        Some(path) => load_dataset(path).with_context(|| format!("loading {}", path.display()))?,
        None => PointDataset::load(planet_shell(5000, config.planet.radius * 1.5, 0.0, 7))?,
    };

    let mut state = ViewerState::new(dataset, config);
    state.viewport = Some(Viewport::new(args.width as f32, args.height as f32));
    state.camera.set_aspect_ratio(args.width, args.height);
    let bounds = CanvasBounds::full(args.width as f32, args.height as f32);

    let clicks = if args.clicks.is_empty() {
        vec![(args.width as f32 / 2.0, args.height as f32 / 2.0)]
    } else {
        args.clicks
    };

    println!("Picking among {} points", state.dataset().map_or(0, |d| d.len()));
    for (x, y) in clicks {
        match handle_click(&mut state, x, y, &bounds) {
            Some(pick) => println!(
                "({:>7.1}, {:>7.1}) -> point {} at distance {:.3}, ray point ({:.3}, {:.3}, {:.3})",
                x, y, pick.point_index, pick.distance, pick.point.x, pick.point.y, pick.point.z
            ),
            None => println!("({:>7.1}, {:>7.1}) -> nothing", x, y),
        }
    }

    println!("Final selection: {:?}", state.selection_state());
    Ok(())
}
