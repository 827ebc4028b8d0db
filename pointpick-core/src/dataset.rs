//! Point dataset with flat per-point attribute buffers
//!
//! A [`PointDataset`] owns three interleaved attribute buffers laid out the
//! way the rasterizer consumes them: positions and colors as `xyz`/`rgb`
//! triplets, sizes as one float per point. Positions and sizes never change
//! after load; colors are rewritten by the selection logic.

use std::ops::Range;

use crate::error::{Error, Result};
use crate::point::*;
use crate::traits::{bounds_of, BoundingSphere, Drawable};

/// Default per-point size in pixels
pub const DEFAULT_POINT_SIZE: f32 = 3.0;

/// Color every point starts with
pub const DEFAULT_POINT_COLOR: Rgb = Rgb::WHITE;

/// Static point positions plus their mutable color buffer
#[derive(Debug, Clone)]
pub struct PointDataset {
    positions: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
    bounding_sphere: Option<BoundingSphere>,
    colors_dirty: bool,
}

impl PointDataset {
    /// Build a dataset from a flat `x, y, z, x, y, z, ...` sequence
    pub fn load(raw: Vec<f32>) -> Result<Self> {
        if raw.len() % 3 != 0 {
            return Err(Error::MalformedInput(format!(
                "position array length {} is not a multiple of 3",
                raw.len()
            )));
        }
        Ok(Self::from_triplets(raw))
    }

    /// Build a dataset from points
    pub fn from_points(points: &[Point3f]) -> Self {
        Self::from_triplets(points.iter().flat_map(|p| [p.x, p.y, p.z]).collect())
    }

    /// `positions` must hold whole triplets
    fn from_triplets(positions: Vec<f32>) -> Self {
        let count = positions.len() / 3;
        let mut dataset = Self {
            positions,
            colors: vec![0.0; count * 3],
            sizes: vec![DEFAULT_POINT_SIZE; count],
            bounding_sphere: None,
            colors_dirty: true,
        };
        dataset.reset_colors(DEFAULT_POINT_COLOR);
        dataset.bounding_sphere = BoundingSphere::from_points(dataset.points());
        dataset
    }

    /// A dataset with no points
    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            colors: Vec::new(),
            sizes: Vec::new(),
            bounding_sphere: None,
            colors_dirty: true,
        }
    }

    /// Get the number of points
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    /// Check if the dataset has no points
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of point `index`
    pub fn position(&self, index: usize) -> Option<Point3f> {
        let p = self.positions.get(triplet(index)?)?;
        Some(Point3f::new(p[0], p[1], p[2]))
    }

    /// Iterate over all positions
    pub fn points(&self) -> impl Iterator<Item = Point3f> + Clone + '_ {
        self.positions
            .chunks_exact(3)
            .map(|p| Point3f::new(p[0], p[1], p[2]))
    }

    /// Flat position buffer
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Current color buffer as interleaved RGB triplets
    pub fn color_buffer(&self) -> &[f32] {
        &self.colors
    }

    /// Per-point size buffer
    pub fn size_buffer(&self) -> &[f32] {
        &self.sizes
    }

    /// Color of point `index`
    pub fn color(&self, index: usize) -> Option<Rgb> {
        let c = self.colors.get(triplet(index)?)?;
        Some(Rgb::new(c[0], c[1], c[2]))
    }

    /// Rewrite the color of every point
    pub fn reset_colors(&mut self, color: Rgb) {
        for rgb in self.colors.chunks_exact_mut(3) {
            rgb.copy_from_slice(&color.to_array());
        }
    }

    /// Set the color of a single point
    pub fn set_color(&mut self, index: usize, color: Rgb) -> Result<()> {
        let len = self.len();
        let rgb = triplet(index)
            .and_then(|range| self.colors.get_mut(range))
            .ok_or(Error::IndexOutOfRange { index, len })?;
        rgb.copy_from_slice(&color.to_array());
        Ok(())
    }

    /// Set the same size for every point
    pub fn set_uniform_size(&mut self, size: f32) {
        self.sizes.fill(size);
    }

    /// Flag the color buffer for re-upload
    pub fn mark_colors_dirty(&mut self) {
        self.colors_dirty = true;
    }

    pub fn is_colors_dirty(&self) -> bool {
        self.colors_dirty
    }

    /// Clear the dirty flag, returning whether it was set
    pub fn take_colors_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.colors_dirty, false)
    }
}

/// Buffer range of the `index`-th triplet, `None` when it cannot be addressed
fn triplet(index: usize) -> Option<Range<usize>> {
    let start = index.checked_mul(3)?;
    Some(start..start.checked_add(3)?)
}

impl Default for PointDataset {
    fn default() -> Self {
        Self::empty()
    }
}

impl Drawable for PointDataset {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(self.points()).unwrap_or((Point3f::origin(), Point3f::origin()))
    }

    fn bounding_sphere(&self) -> Option<BoundingSphere> {
        self.bounding_sphere
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_load_rejects_partial_triplet() {
        let result = PointDataset::load(vec![0.0, 1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_load_initializes_buffers() {
        let dataset = PointDataset::load(vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0]).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.positions().len(), 6);
        assert_eq!(dataset.color_buffer(), &[1.0; 6]);
        assert_eq!(dataset.size_buffer(), &[DEFAULT_POINT_SIZE; 2]);
        assert_eq!(dataset.position(1), Some(Point3f::new(1.0, 2.0, 3.0)));
        assert_eq!(dataset.position(2), None);
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = PointDataset::load(Vec::new()).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.bounding_sphere().is_none());
        assert!(dataset.color_buffer().is_empty());
    }

    #[test]
    fn test_reset_colors_is_exhaustive() {
        for count in [0usize, 1, 7, 256] {
            let raw: Vec<f32> = (0..count * 3).map(|v| v as f32).collect();
            let mut dataset = PointDataset::load(raw).unwrap();

            for i in (0..count).step_by(2) {
                dataset.set_color(i, Rgb::RED).unwrap();
            }
            dataset.reset_colors(Rgb::WHITE);

            assert!((0..count).all(|i| dataset.color(i) == Some(Rgb::WHITE)));
            assert_eq!(dataset.color_buffer().len(), count * 3);
        }
    }

    #[test]
    fn test_set_color_out_of_range() {
        let mut dataset = PointDataset::from_points(&[Point3f::origin()]);

        assert!(dataset.set_color(0, Rgb::RED).is_ok());
        assert_eq!(dataset.color_buffer(), &[1.0, 0.0, 0.0]);

        match dataset.set_color(1, Rgb::RED) {
            Err(Error::IndexOutOfRange { index, len }) => {
                assert_eq!(index, 1);
                assert_eq!(len, 1);
            }
            other => panic!("expected IndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_huge_index_is_out_of_range() {
        let mut dataset = PointDataset::from_points(&[Point3f::origin()]);

        assert!(matches!(
            dataset.set_color(usize::MAX, Rgb::RED),
            Err(Error::IndexOutOfRange { index: usize::MAX, len: 1 })
        ));
        assert!(matches!(
            dataset.set_color(usize::MAX / 3, Rgb::RED),
            Err(Error::IndexOutOfRange { .. })
        ));
        assert_eq!(dataset.position(usize::MAX), None);
        assert_eq!(dataset.color(usize::MAX), None);
        assert_eq!(dataset.color(0), Some(Rgb::WHITE));
    }

    #[test]
    fn test_from_points_matches_load() {
        let points = [Point3f::new(1.0, 2.0, 3.0), Point3f::new(-1.0, 0.0, 4.0)];
        let built = PointDataset::from_points(&points);
        let loaded = PointDataset::load(vec![1.0, 2.0, 3.0, -1.0, 0.0, 4.0]).unwrap();

        assert_eq!(built.positions(), loaded.positions());
        assert_eq!(built.color_buffer(), loaded.color_buffer());
        assert_eq!(built.size_buffer(), loaded.size_buffer());
        assert_eq!(built.bounding_sphere(), loaded.bounding_sphere());
    }

    #[test]
    fn test_dirty_flag() {
        let mut dataset = PointDataset::from_points(&[Point3f::origin()]);
        assert!(dataset.take_colors_dirty());
        assert!(!dataset.is_colors_dirty());

        dataset.mark_colors_dirty();
        assert!(dataset.take_colors_dirty());
        assert!(!dataset.take_colors_dirty());
    }

    #[test]
    fn test_bounding_sphere() {
        let dataset = PointDataset::from_points(&[
            Point3f::new(-2.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ]);

        let sphere = dataset.bounding_sphere().unwrap();
        assert_relative_eq!(sphere.center, Point3f::new(0.0, 0.5, 0.0));
        assert_relative_eq!(sphere.radius, (4.0f32 + 0.25).sqrt(), epsilon = 1e-6);
        assert_relative_eq!(dataset.center(), Point3f::new(0.0, 0.5, 0.0));
    }
}
