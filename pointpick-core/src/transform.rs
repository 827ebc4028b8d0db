//! Object-to-world transforms for scene objects

use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::point::*;

/// A 3D affine transformation placing an object in the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(translation: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }

    /// Create a rotation transformation from a quaternion
    pub fn rotation(rotation: UnitQuaternion<f32>) -> Self {
        Self {
            matrix: rotation.to_homogeneous(),
        }
    }

    /// Create a uniform scaling transformation
    pub fn uniform_scaling(scale: f32) -> Self {
        Self {
            matrix: Matrix4::new_scaling(scale),
        }
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3f) -> Point3f {
        self.matrix.transform_point(point)
    }

    /// Apply the linear part of the transformation to a vector
    pub fn transform_vector(&self, vector: &Vector3f) -> Vector3f {
        self.matrix.transform_vector(vector)
    }

    /// Length of each basis axis, i.e. the scale along x, y and z
    pub fn scale(&self) -> Vector3f {
        Vector3f::new(
            self.matrix.fixed_view::<3, 1>(0, 0).norm(),
            self.matrix.fixed_view::<3, 1>(0, 1).norm(),
            self.matrix.fixed_view::<3, 1>(0, 2).norm(),
        )
    }

    /// Average of the three axis scales
    pub fn mean_scale(&self) -> f32 {
        let s = self.scale();
        (s.x + s.y + s.z) / 3.0
    }

    /// Compose this transformation with another (`self` applied last)
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Get the inverse transformation
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|inv_matrix| Self {
            matrix: inv_matrix,
        })
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl From<Matrix4<f32>> for Transform3D {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_scale() {
        let t = Transform3D::translation(Vector3f::new(1.0, 2.0, 3.0)) * Transform3D::uniform_scaling(2.0);
        assert_relative_eq!(t.mean_scale(), 2.0, epsilon = 1e-6);
        assert_relative_eq!(
            t.transform_point(&Point3f::new(1.0, 0.0, 0.0)),
            Point3f::new(3.0, 2.0, 3.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_inverse_roundtrip() {
        let t = Transform3D::translation(Vector3f::new(0.0, -4.0, 1.0));
        let inv = t.inverse().unwrap();
        let p = Point3f::new(5.0, 6.0, 7.0);
        assert_relative_eq!(inv.transform_point(&t.transform_point(&p)), p, epsilon = 1e-5);
        assert!(Transform3D::uniform_scaling(0.0).inverse().is_none());
    }
}
