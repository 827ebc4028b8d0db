//! # pointpick
//!
//! Interactive point cloud viewing with ray-cast point picking.
//!
//! This is the umbrella crate that provides convenient access to all pointpick functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Point datasets, colors, meshes, rays and the perspective camera
//! - **Picking**: Scene, ray caster, picking engine and selection highlighting
//! - **I/O**: Position assets from JSON or delimited text, synthetic planets
//! - **GPU**: wgpu point rendering with fixed-size or depth-scaled points
//! - **Visualization**: Orbit controls and the interactive viewer
//!
//! ## Quick Start
//!
//! ```rust
//! use pointpick::prelude::*;
//!
//! let mut scene = Scene::new();
//! let cloud = scene.add(
//!     "points",
//!     ObjectKind::Points(PointDataset::load(vec![0.0, 0.0, 0.0, 10.0, 0.0, 0.0]).unwrap()),
//! );
//!
//! let mut camera = PerspectiveCamera::default();
//! camera.position = Point3f::new(0.0, 0.0, 10.0);
//!
//! let engine = PickingEngine::new();
//! let pick = engine.pick(
//!     PixelPosition::new(50.0, 50.0),
//!     Viewport::new(100.0, 100.0),
//!     &camera,
//!     &scene,
//!     cloud,
//! );
//! assert_eq!(pick.map(|p| p.point_index), Some(0));
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables core, picking and io
//! - `core`: Core data structures (always enabled)
//! - `picking`: Ray casting and selection
//! - `io`: Position asset loading
//! - `gpu`: wgpu rendering
//! - `visualization`: Interactive viewer (implies `picking` and `gpu`)
//! - `all`: Enables all features

// Re-export core functionality
pub use pointpick_core::*;

// Re-export sub-crates
#[cfg(feature = "picking")]
pub use pointpick_picking as picking;

#[cfg(feature = "io")]
pub use pointpick_io as io;

#[cfg(feature = "gpu")]
pub use pointpick_gpu as gpu;

#[cfg(feature = "visualization")]
pub use pointpick_visualization as visualization;

/// Convenient imports for common use cases
pub mod prelude {
    pub use pointpick_core::*;

    #[cfg(feature = "picking")]
    pub use pointpick_picking::*;

    #[cfg(feature = "io")]
    pub use pointpick_io::{load_dataset, planet_shell, read_positions};

    #[cfg(feature = "gpu")]
    pub use pointpick_gpu::{PointCloudRenderer, PointRenderingStrategy, StrategyKind};

    #[cfg(feature = "visualization")]
    pub use pointpick_visualization::{InteractiveViewer, OrbitControls, ViewerConfig, ViewerShell, ViewerState};
}
