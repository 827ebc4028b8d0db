//! # pointpick GPU
//!
//! wgpu rendering for pointpick: a device context, the two point rendering
//! strategies and a window renderer that keeps point clouds and helper
//! geometry resident on the GPU.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pointpick_gpu::{PointCloudRenderer, RenderConfig, StrategyKind};
//! use pointpick_core::{PerspectiveCamera, PointDataset, Transform3D};
//!
//! async fn example(window: Arc<winit::window::Window>, dataset: &PointDataset) -> pointpick_core::Result<()> {
//!     let mut renderer =
//!         PointCloudRenderer::new(window, StrategyKind::DepthScaled.create(), RenderConfig::default()).await?;
//!     renderer.upload_points(0, dataset, &Transform3D::identity());
//!     renderer.render(&PerspectiveCamera::default())?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod strategy;
pub mod solid;
pub mod renderer;

// Re-export commonly used items
pub use device::GpuContext;
pub use strategy::{DepthScaledShaderPoints, FixedSizePoints, PointRenderingStrategy, StrategyKind, ADDITIVE_BLENDING};
pub use solid::{SolidMesh, SolidTopology, SolidVertex};
pub use renderer::{CameraUniform, PointCloudRenderer, PointStyleUniform, RenderConfig, OPENGL_TO_WGPU};
