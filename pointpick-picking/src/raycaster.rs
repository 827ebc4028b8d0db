//! Ray casting against point clouds and meshes
//!
//! Points have no surface, so a point counts as hit when the ray passes
//! within `points_threshold` of it. Meshes are tested triangle by triangle
//! with back faces culled. All candidates from all objects come back in one
//! list sorted by distance from the ray origin.

use nalgebra::Point2;
use rayon::prelude::*;

use pointpick_core::{Drawable, PerspectiveCamera, Point3f, PointDataset, Ray, Transform3D, TriangleMesh};

use crate::scene::{ObjectId, ObjectKind, Scene, SceneObject};

/// Default world-space proximity for point hits
pub const DEFAULT_POINTS_THRESHOLD: f32 = 0.1;

/// Point clouds larger than this are scanned on the rayon pool
pub const PARALLEL_POINT_COUNT: usize = 1 << 16;

/// One ray/geometry intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionCandidate {
    /// Object that was hit
    pub target: ObjectId,
    /// Point index for point clouds, face index for meshes
    pub index: usize,
    /// Distance from the ray origin to `point`
    pub distance: f32,
    /// World-space intersection point
    pub point: Point3f,
    /// Perpendicular distance between a hit point and the ray; `None` for faces
    pub distance_to_ray: Option<f32>,
}

/// Casts a single ray against scene objects
#[derive(Debug, Clone)]
pub struct Raycaster {
    pub ray: Ray,
    pub near: f32,
    pub far: f32,
    pub points_threshold: f32,
}

impl Raycaster {
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            near: 0.0,
            far: f32::INFINITY,
            points_threshold: DEFAULT_POINTS_THRESHOLD,
        }
    }

    pub fn with_points_threshold(mut self, threshold: f32) -> Self {
        self.points_threshold = threshold;
        self
    }

    /// Aim the ray from `camera` through device coordinates `ndc`.
    ///
    /// Returns `false` and leaves the ray untouched when the camera cannot
    /// be unprojected.
    pub fn set_from_camera(&mut self, ndc: &Point2<f32>, camera: &PerspectiveCamera) -> bool {
        match camera.ray_through(ndc) {
            Some(ray) => {
                self.ray = ray;
                true
            }
            None => false,
        }
    }

    /// All intersections with every pickable object, closest first
    pub fn intersect_scene(&self, scene: &Scene) -> Vec<IntersectionCandidate> {
        let mut hits = Vec::new();
        for object in scene {
            self.collect_object(object, &mut hits);
        }
        sort_by_distance(&mut hits);
        hits
    }

    /// Intersections with a single object, closest first
    pub fn intersect_object(&self, object: &SceneObject) -> Vec<IntersectionCandidate> {
        let mut hits = Vec::new();
        self.collect_object(object, &mut hits);
        sort_by_distance(&mut hits);
        hits
    }

    fn collect_object(&self, object: &SceneObject, hits: &mut Vec<IntersectionCandidate>) {
        if !object.is_pickable() {
            return;
        }

        match &object.kind {
            ObjectKind::Points(dataset) => {
                self.intersect_points(object.id, dataset, &object.transform, hits)
            }
            ObjectKind::Mesh { mesh, .. } => {
                self.intersect_mesh(object.id, mesh, &object.transform, hits)
            }
            ObjectKind::Arrow(_) => {}
        }
    }

    fn intersect_points(
        &self,
        target: ObjectId,
        dataset: &PointDataset,
        transform: &Transform3D,
        hits: &mut Vec<IntersectionCandidate>,
    ) {
        let Some(sphere) = dataset.bounding_sphere() else {
            return;
        };
        let Some(inverse) = transform.inverse() else {
            return;
        };

        // The threshold is given in world units; scale it into object space
        let scale = transform.mean_scale();
        if scale <= 0.0 {
            return;
        }
        let local_threshold = self.points_threshold / scale;
        let local_threshold_sq = local_threshold * local_threshold;

        let local_ray = self.ray.transformed(&inverse);
        if !local_ray.intersects_sphere(&sphere.expanded(local_threshold)) {
            return;
        }

        let test_point = |(index, position): (usize, Point3f)| {
            let distance_sq = local_ray.distance_sq_to_point(&position);
            // A zero threshold still admits points lying exactly on the ray
            let within = distance_sq < local_threshold_sq || (local_threshold_sq == 0.0 && distance_sq == 0.0);
            if !within {
                return None;
            }

            let point = transform.transform_point(&local_ray.closest_point_to_point(&position));
            let distance = (point - self.ray.origin).norm();
            if distance < self.near || distance > self.far {
                return None;
            }

            Some(IntersectionCandidate {
                target,
                index,
                distance,
                point,
                distance_to_ray: Some(distance_sq.sqrt()),
            })
        };

        if dataset.len() >= PARALLEL_POINT_COUNT {
            let found: Vec<_> = dataset
                .positions()
                .par_chunks_exact(3)
                .enumerate()
                .map(|(i, p)| (i, Point3f::new(p[0], p[1], p[2])))
                .filter_map(test_point)
                .collect();
            hits.extend(found);
        } else {
            hits.extend(dataset.points().enumerate().filter_map(test_point));
        }
    }

    fn intersect_mesh(
        &self,
        target: ObjectId,
        mesh: &TriangleMesh,
        transform: &Transform3D,
        hits: &mut Vec<IntersectionCandidate>,
    ) {
        let Some(sphere) = mesh.bounding_sphere() else {
            return;
        };
        let Some(inverse) = transform.inverse() else {
            return;
        };

        let local_ray = self.ray.transformed(&inverse);
        if !local_ray.intersects_sphere(&sphere) {
            return;
        }

        for index in 0..mesh.face_count() {
            let Some([a, b, c]) = mesh.triangle(index) else {
                continue;
            };
            let Some(local_hit) = local_ray.intersect_triangle(&a, &b, &c, true) else {
                continue;
            };

            let point = transform.transform_point(&local_hit);
            let distance = (point - self.ray.origin).norm();
            if distance < self.near || distance > self.far {
                continue;
            }

            hits.push(IntersectionCandidate {
                target,
                index,
                distance,
                point,
                distance_to_ray: None,
            });
        }
    }
}

fn sort_by_distance(hits: &mut [IntersectionCandidate]) {
    hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pointpick_core::{Rgb, Vector3f};

    fn ray_down_z() -> Ray {
        Ray::new(Point3f::new(0.0, 0.0, 10.0), Vector3f::new(0.0, 0.0, -1.0))
    }

    fn line_cloud() -> PointDataset {
        PointDataset::from_points(&[
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(10.0, 0.0, 0.0),
            Point3f::new(100.0, 0.0, 0.0),
        ])
    }

    #[test]
    fn test_points_within_threshold() {
        let mut scene = Scene::new();
        let cloud = scene.add("cloud", ObjectKind::Points(line_cloud()));

        let hits = Raycaster::new(ray_down_z()).intersect_scene(&scene);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, cloud);
        assert_eq!(hits[0].index, 0);
        assert_relative_eq!(hits[0].distance, 10.0, epsilon = 1e-5);
        assert_relative_eq!(hits[0].distance_to_ray.unwrap(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut scene = Scene::new();
        scene.add("cloud", ObjectKind::Points(PointDataset::from_points(&[Point3f::new(0.5, 0.0, 0.0)])));

        let caster = Raycaster::new(ray_down_z());
        assert!(caster.clone().with_points_threshold(0.5).intersect_scene(&scene).is_empty());
        assert_eq!(caster.clone().with_points_threshold(0.51).intersect_scene(&scene).len(), 1);
        assert!(caster.with_points_threshold(0.0).intersect_scene(&scene).is_empty());
    }

    #[test]
    fn test_zero_threshold_exact_hit() {
        let mut scene = Scene::new();
        scene.add(
            "cloud",
            ObjectKind::Points(PointDataset::from_points(&[
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(0.001, 0.0, 0.0),
            ])),
        );

        let hits = Raycaster::new(ray_down_z()).with_points_threshold(0.0).intersect_scene(&scene);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 0);
        assert_relative_eq!(hits[0].distance, 10.0, epsilon = 1e-5);
    }

    #[test]
    fn test_threshold_follows_object_scale() {
        let mut scene = Scene::new();
        // Local x = 0.1 sits at world x = 0.4 once scaled by 4
        scene.add_with_transform(
            "cloud",
            ObjectKind::Points(PointDataset::from_points(&[Point3f::new(0.1, 0.0, 0.0)])),
            Transform3D::uniform_scaling(4.0),
        );

        let caster = Raycaster::new(ray_down_z());
        assert!(caster.clone().with_points_threshold(0.35).intersect_scene(&scene).is_empty());

        let hits = caster.with_points_threshold(0.45).intersect_scene(&scene);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point, Point3f::new(0.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_hits_sorted_across_objects() {
        let mut scene = Scene::new();
        let planet = scene.add(
            "planet",
            ObjectKind::Mesh { mesh: TriangleMesh::uv_sphere(2.0, 32, 32), color: Rgb::from_hex(0x3322ff) },
        );
        let cloud = scene.add(
            "cloud",
            ObjectKind::Points(PointDataset::from_points(&[
                Point3f::new(0.0, 0.0, -5.0),
                Point3f::new(0.0, 0.0, 5.0),
            ])),
        );

        // Slightly off the axis so the planet is entered through a face interior
        let ray = Ray::new(Point3f::new(0.05, 0.07, 10.0), Vector3f::new(0.0, 0.0, -1.0));
        let hits = Raycaster::new(ray).intersect_scene(&scene);
        let order: Vec<_> = hits.iter().map(|h| (h.target, h.index)).collect();

        // Near point, front face of the planet, far point. Back faces are culled.
        assert_eq!(hits.len(), 3);
        assert_eq!(order[0], (cloud, 1));
        assert_eq!(order[1].0, planet);
        assert_eq!(order[2], (cloud, 0));
        assert_relative_eq!(hits[1].distance, 8.0, epsilon = 0.05);
    }

    #[test]
    fn test_near_far_clip() {
        let mut scene = Scene::new();
        scene.add("cloud", ObjectKind::Points(line_cloud()));

        let mut caster = Raycaster::new(ray_down_z());
        caster.far = 5.0;
        assert!(caster.intersect_scene(&scene).is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let caster = Raycaster::new(ray_down_z());
        assert!(caster.intersect_scene(&Scene::new()).is_empty());

        let mut scene = Scene::new();
        let id = scene.add("cloud", ObjectKind::Points(PointDataset::empty()));
        assert!(caster.intersect_object(scene.get(id).unwrap()).is_empty());
    }

    #[test]
    fn test_parallel_scan_matches_sequential() {
        let count = PARALLEL_POINT_COUNT + 10;
        let positions: Vec<Point3f> = (0..count)
            .map(|i| Point3f::new((i % 7) as f32 * 0.03, 0.0, -(i as f32) * 0.001))
            .collect();

        let mut scene = Scene::new();
        scene.add("cloud", ObjectKind::Points(PointDataset::from_points(&positions)));

        let hits = Raycaster::new(ray_down_z()).intersect_scene(&scene);
        let expected = positions.iter().filter(|p| p.x < 0.1).count();
        assert_eq!(hits.len(), expected);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }
}
