//! Interactive viewing of point clouds
//!
//! This crate ties picking and rendering into a viewer:
//! - [`ViewerConfig`] loaded from TOML
//! - [`OrbitControls`] for the camera
//! - [`ViewerState`] and [`ViewerShell`], the renderer-agnostic viewer core
//! - [`InteractiveViewer`], a winit window on native targets
//! - a `start_viewer` entry point when built for the browser

pub mod config;
pub mod orbit;
pub mod viewer;
pub mod renderer;
pub mod interactive_viewer;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::*;
pub use orbit::*;
pub use viewer::*;
pub use renderer::*;
pub use interactive_viewer::*;

/// Show `dataset` in a window with the default settings until it is closed
#[cfg(not(target_arch = "wasm32"))]
pub fn show_point_cloud(dataset: pointpick_core::PointDataset) -> pointpick_core::Result<()> {
    InteractiveViewer::new(dataset, ViewerConfig::default()).run()
}
