//! Perspective camera with unprojection for ray casting

use nalgebra::{Matrix4, Perspective3, Point2, Vector4};
use serde::{Deserialize, Serialize};

use crate::point::*;
use crate::ray::Ray;

/// A perspective camera looking from `position` at `target`.
///
/// The projection follows the OpenGL clip-space convention (depth in
/// `[-1, 1]`); renderers targeting a `[0, 1]` depth range correct for it
/// themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub position: Point3f,
    pub target: Point3f,
    pub up: Vector3f,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    /// Optical zoom; narrows the effective field of view
    pub zoom: f32,
}

impl PerspectiveCamera {
    /// Create a new camera looking at the origin
    pub fn new(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            position: Point3f::new(0.0, 0.0, 5.0),
            target: Point3f::origin(),
            up: Vector3f::y(),
            fov,
            aspect_ratio,
            near,
            far,
            zoom: 1.0,
        }
    }

    /// Vertical field of view in radians after applying `zoom`
    pub fn effective_fov(&self) -> f32 {
        let half = (self.fov.to_radians() * 0.5).tan() / self.zoom;
        2.0 * half.atan()
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect_ratio, self.effective_fov(), self.near, self.far).into_inner()
    }

    /// Projection times view
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map device coordinates (with depth in `[-1, 1]`) back to world space
    pub fn unproject(&self, ndc: &Point3f) -> Option<Point3f> {
        let inverse = self.view_projection().try_inverse()?;
        let world = inverse * Vector4::new(ndc.x, ndc.y, ndc.z, 1.0);
        if world.w.abs() <= f32::EPSILON || !world.iter().all(|v| v.is_finite()) {
            return None;
        }
        Some(Point3f::from(world.xyz() / world.w))
    }

    /// Ray from the camera through a point given in device coordinates
    pub fn ray_through(&self, ndc: &Point2<f32>) -> Option<Ray> {
        let on_frustum = self.unproject(&Point3f::new(ndc.x, ndc.y, 0.5))?;
        let direction = on_frustum - self.position;
        if direction.norm_squared() <= f32::EPSILON {
            return None;
        }
        Some(Ray::new(self.position, direction))
    }

    /// Distance between the camera and its target
    pub fn distance_to_target(&self) -> f32 {
        (self.position - self.target).norm()
    }

    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(45.0, 1.0, 0.1, 1000.0)
    }
}
