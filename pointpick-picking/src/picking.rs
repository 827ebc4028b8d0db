//! Mapping a pixel under the pointer to a point of the cloud
//!
//! Picking runs in three steps: normalize the pixel into device coordinates
//! (flipping Y, since screen rows grow downward), cast a ray from the
//! camera through it, and keep the closest intersection that belongs to the
//! point cloud. Every other outcome, including degenerate viewports and
//! cameras, is a miss rather than an error.

use nalgebra::Point2;

use pointpick_core::{PerspectiveCamera, Point3f, Ray};

use crate::raycaster::{IntersectionCandidate, Raycaster, DEFAULT_POINTS_THRESHOLD};
use crate::scene::{ObjectId, Scene};

/// Pointer position in pixels, relative to the top-left of the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPosition {
    pub x: f32,
    pub y: f32,
}

impl PixelPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Normalize a pixel position into `[-1, 1]` device coordinates, Y up.
///
/// Returns `None` for an empty viewport.
pub fn to_device_coords(pointer: PixelPosition, viewport: Viewport) -> Option<Point2<f32>> {
    if viewport.is_empty() {
        return None;
    }

    Some(Point2::new(
        (pointer.x / viewport.width) * 2.0 - 1.0,
        -(pointer.y / viewport.height) * 2.0 + 1.0,
    ))
}

/// The ray of one pick attempt and everything it crossed
#[derive(Debug, Clone)]
pub struct CastResult {
    pub ray: Ray,
    pub candidates: Vec<IntersectionCandidate>,
}

/// A point of the cloud under the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    pub point_index: usize,
    /// Distance from the camera to `point`
    pub distance: f32,
    /// Closest point on the ray to the picked point
    pub point: Point3f,
    pub world_ray: Ray,
}

/// Resolves pointer positions to point indices
#[derive(Debug, Clone)]
pub struct PickingEngine {
    threshold: f32,
}

impl PickingEngine {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_POINTS_THRESHOLD)
    }

    /// Engine with a custom point proximity threshold in world units
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.max(0.0);
    }

    /// Cast a ray through `pointer` and collect every intersection in `scene`
    pub fn cast(
        &self,
        pointer: PixelPosition,
        viewport: Viewport,
        camera: &PerspectiveCamera,
        scene: &Scene,
    ) -> Option<CastResult> {
        let ndc = to_device_coords(pointer, viewport)?;
        let ray = camera.ray_through(&ndc)?;

        let candidates = Raycaster::new(ray)
            .with_points_threshold(self.threshold)
            .intersect_scene(scene);

        Some(CastResult { ray, candidates })
    }

    /// Closest candidate of a cast that hit the point cloud `target`
    pub fn resolve(&self, cast: &CastResult, target: ObjectId) -> Option<PickResult> {
        cast.candidates
            .iter()
            .find(|c| c.target == target)
            .map(|hit| PickResult {
                point_index: hit.index,
                distance: hit.distance,
                point: hit.point,
                world_ray: cast.ray,
            })
    }

    /// Point of `target` under `pointer`, if any
    pub fn pick(
        &self,
        pointer: PixelPosition,
        viewport: Viewport,
        camera: &PerspectiveCamera,
        scene: &Scene,
        target: ObjectId,
    ) -> Option<PickResult> {
        let cast = self.cast(pointer, viewport, camera, scene)?;
        self.resolve(&cast, target)
    }
}

impl Default for PickingEngine {
    fn default() -> Self {
        Self::new()
    }
}
