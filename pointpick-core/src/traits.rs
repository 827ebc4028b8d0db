//! Core traits for pointpick

use crate::point::*;

/// Sphere enclosing a drawable, used to reject rays early
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3f,
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere centered on the bounding box of `points`, reaching the farthest one.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: Iterator<Item = Point3f> + Clone,
    {
        let (min, max) = bounds_of(points.clone())?;
        let center = nalgebra::center(&min, &max);
        let radius_sq = points
            .map(|p| (p - center).norm_squared())
            .fold(0.0f32, f32::max);

        Some(Self {
            center,
            radius: radius_sq.sqrt(),
        })
    }

    /// Copy of this sphere with the radius grown by `margin`
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            center: self.center,
            radius: self.radius + margin,
        }
    }
}

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the bounding sphere of the object, `None` when it has no geometry
    fn bounding_sphere(&self) -> Option<BoundingSphere>;

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }
}

/// Axis-aligned bounds of a point sequence
pub(crate) fn bounds_of<I>(mut points: I) -> Option<(Point3f, Point3f)>
where
    I: Iterator<Item = Point3f>,
{
    let first = points.next()?;
    let mut min = first;
    let mut max = first;

    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);

        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }

    Some((min, max))
}
