//! Half-infinite rays and the primitive intersection tests used for picking

use crate::point::*;
use crate::traits::BoundingSphere;
use crate::transform::Transform3D;

/// A ray with an origin and a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3f,
    pub direction: Vector3f,
}

impl Ray {
    /// Create a ray, normalizing `direction`
    pub fn new(origin: Point3f, direction: Vector3f) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(f32::EPSILON).unwrap_or(direction),
        }
    }

    /// Point at parameter `t` along the ray
    pub fn at(&self, t: f32) -> Point3f {
        self.origin + self.direction * t
    }

    /// Closest point on the ray to `point`, never behind the origin
    pub fn closest_point_to_point(&self, point: &Point3f) -> Point3f {
        let t = (point - self.origin).dot(&self.direction);
        if t < 0.0 {
            self.origin
        } else {
            self.at(t)
        }
    }

    /// Squared distance between `point` and the closest point on the ray
    pub fn distance_sq_to_point(&self, point: &Point3f) -> f32 {
        (self.closest_point_to_point(point) - point).norm_squared()
    }

    /// Whether the ray passes through (or starts inside) a sphere
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.distance_sq_to_point(&sphere.center) <= sphere.radius * sphere.radius
    }

    /// Intersect the triangle `a`, `b`, `c`.
    ///
    /// Triangles are front facing when wound counter-clockwise as seen by the
    /// ray; with `cull_backface` set, back facing triangles are never hit.
    pub fn intersect_triangle(
        &self,
        a: &Point3f,
        b: &Point3f,
        c: &Point3f,
        cull_backface: bool,
    ) -> Option<Point3f> {
        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1.cross(&edge2);

        let mut d_dot_n = self.direction.dot(&normal);
        let sign = if d_dot_n > 0.0 {
            if cull_backface {
                return None;
            }
            1.0
        } else if d_dot_n < 0.0 {
            d_dot_n = -d_dot_n;
            -1.0
        } else {
            return None;
        };

        let diff = self.origin - a;
        let b1 = sign * self.direction.dot(&diff.cross(&edge2));
        if b1 < 0.0 {
            return None;
        }

        let b2 = sign * self.direction.dot(&edge1.cross(&diff));
        if b2 < 0.0 || b1 + b2 > d_dot_n {
            return None;
        }

        let q_dot_n = -sign * diff.dot(&normal);
        if q_dot_n < 0.0 {
            return None;
        }

        Some(self.at(q_dot_n / d_dot_n))
    }

    /// The same ray expressed through `transform`
    pub fn transformed(&self, transform: &Transform3D) -> Self {
        Self::new(
            transform.transform_point(&self.origin),
            transform.transform_vector(&self.direction),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn down_z() -> Ray {
        Ray::new(Point3f::new(0.0, 0.0, 10.0), Vector3f::new(0.0, 0.0, -2.0))
    }

    #[test]
    fn test_direction_is_normalized() {
        assert_relative_eq!(down_z().direction, Vector3f::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_distance_to_point() {
        let ray = down_z();
        assert_relative_eq!(ray.distance_sq_to_point(&Point3f::new(3.0, 4.0, 0.0)), 25.0);

        // Behind the origin the distance is measured to the origin itself
        assert_relative_eq!(ray.distance_sq_to_point(&Point3f::new(0.0, 1.0, 12.0)), 5.0);
        assert_eq!(ray.closest_point_to_point(&Point3f::new(0.0, 1.0, 12.0)), ray.origin);
    }

    #[test]
    fn test_triangle_front_and_back() {
        let ray = down_z();
        let a = Point3f::new(-1.0, -1.0, 0.0);
        let b = Point3f::new(1.0, -1.0, 0.0);
        let c = Point3f::new(0.0, 1.0, 0.0);

        // Counter-clockwise seen from +z: front facing
        let hit = ray.intersect_triangle(&a, &b, &c, true).unwrap();
        assert_relative_eq!(hit, Point3f::new(0.0, 0.0, 0.0), epsilon = 1e-6);

        // Reversed winding is culled but still hits without culling
        assert!(ray.intersect_triangle(&a, &c, &b, true).is_none());
        assert!(ray.intersect_triangle(&a, &c, &b, false).is_some());
    }

    #[test]
    fn test_triangle_miss() {
        let ray = Ray::new(Point3f::new(5.0, 5.0, 10.0), Vector3f::new(0.0, 0.0, -1.0));
        let a = Point3f::new(-1.0, -1.0, 0.0);
        let b = Point3f::new(1.0, -1.0, 0.0);
        let c = Point3f::new(0.0, 1.0, 0.0);
        assert!(ray.intersect_triangle(&a, &b, &c, false).is_none());
    }

    #[test]
    fn test_sphere_test() {
        let ray = down_z();
        let sphere = BoundingSphere { center: Point3f::new(1.0, 0.0, 0.0), radius: 1.5 };
        assert!(ray.intersects_sphere(&sphere));
        assert!(!ray.intersects_sphere(&BoundingSphere { radius: 0.5, ..sphere }));
    }
}
