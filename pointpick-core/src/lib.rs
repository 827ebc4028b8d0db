//! Core data structures and traits for pointpick
//!
//! This crate provides the fundamental types shared by the picking, rendering
//! and viewer crates: point datasets with their attribute buffers, colors,
//! triangle meshes, rays, transforms and the perspective camera.

pub mod point;
pub mod dataset;
pub mod mesh;
pub mod traits;
pub mod transform;
pub mod ray;
pub mod camera;
pub mod error;

pub use point::*;
pub use dataset::*;
pub use mesh::*;
pub use traits::*;
pub use transform::*;
pub use ray::*;
pub use camera::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point2, Point3, Vector3, Matrix4};
