//! Triangle mesh data structures and primitive generators

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::point::*;
use crate::traits::{bounds_of, BoundingSphere, Drawable};

/// A triangle mesh with vertices and faces.
///
/// Faces are wound counter-clockwise when seen from their front side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Latitude/longitude sphere centered on the origin.
    ///
    /// Produces `(width_segments + 1) * (height_segments + 1)` vertices with
    /// the seam and pole vertices duplicated, so the poles collapse into
    /// single triangles per segment.
    pub fn uv_sphere(radius: f32, width_segments: usize, height_segments: usize) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut vertices = Vec::with_capacity((width_segments + 1) * (height_segments + 1));
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                vertices.push(Point3f::new(
                    -radius * (u * 2.0 * PI).cos() * (v * PI).sin(),
                    radius * (v * PI).cos(),
                    radius * (u * 2.0 * PI).sin() * (v * PI).sin(),
                ));
            }
        }

        let row = width_segments + 1;
        let mut faces = Vec::with_capacity(width_segments * height_segments * 2);
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;

                if iy != 0 {
                    faces.push([a, b, d]);
                }
                if iy != height_segments - 1 {
                    faces.push([b, c, d]);
                }
            }
        }

        Self { vertices, faces }
    }

    /// Closed cone from a circular base around `base` to `apex`
    pub fn cone(base: Point3f, apex: Point3f, radius: f32, radial_segments: usize) -> Self {
        let radial_segments = radial_segments.max(3);
        let axis = apex - base;
        let Some(axis_dir) = axis.try_normalize(f32::EPSILON) else {
            return Self::new();
        };

        // Any vector not parallel to the axis spans the base plane
        let helper = if axis_dir.x.abs() < 0.9 { Vector3f::x() } else { Vector3f::y() };
        let side = axis_dir.cross(&helper).normalize();
        let across = axis_dir.cross(&side);

        let mut vertices = Vec::with_capacity(radial_segments + 2);
        vertices.push(apex);
        vertices.push(base);
        for i in 0..radial_segments {
            let angle = i as f32 / radial_segments as f32 * 2.0 * PI;
            vertices.push(base + (side * angle.cos() + across * angle.sin()) * radius);
        }

        let mut faces = Vec::with_capacity(radial_segments * 2);
        for i in 0..radial_segments {
            let current = 2 + i;
            let next = 2 + (i + 1) % radial_segments;
            faces.push([0, current, next]);
            faces.push([1, next, current]);
        }

        Self { vertices, faces }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Corner positions of face `index`
    pub fn triangle(&self, index: usize) -> Option<[Point3f; 3]> {
        let face = self.faces.get(index)?;
        Some([
            *self.vertices.get(face[0])?,
            *self.vertices.get(face[1])?,
            *self.vertices.get(face[2])?,
        ])
    }

    /// Flattened `u32` index buffer
    pub fn index_buffer(&self) -> Vec<u32> {
        self.faces
            .iter()
            .flat_map(|f| [f[0] as u32, f[1] as u32, f[2] as u32])
            .collect()
    }
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(self.vertices.iter().copied()).unwrap_or((Point3f::origin(), Point3f::origin()))
    }

    fn bounding_sphere(&self) -> Option<BoundingSphere> {
        BoundingSphere::from_points(self.vertices.iter().copied())
    }
}
