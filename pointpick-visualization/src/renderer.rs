//! Scene objects on the GPU renderer

use pointpick_core::{PerspectiveCamera, Result, Transform3D};
use pointpick_gpu::{PointCloudRenderer, SolidMesh};
use pointpick_picking::{ArrowHelper, ObjectId, ObjectKind, SceneObject};

use crate::viewer::FrameRenderer;

const ARROW_HEAD_SEGMENTS: usize = 8;

/// Solid geometry of an arrow: the shaft as a line, the head as a cone
pub fn arrow_parts(arrow: &ArrowHelper, transform: &Transform3D) -> Vec<SolidMesh> {
    let start = transform.transform_point(&arrow.origin);
    let end = transform.transform_point(&arrow.shaft_end());

    vec![
        SolidMesh::line(&start, &end, arrow.color),
        SolidMesh::triangles(&arrow.head_mesh(ARROW_HEAD_SEGMENTS), transform, arrow.color),
    ]
}

impl FrameRenderer for PointCloudRenderer {
    fn upload_object(&mut self, object: &SceneObject) -> Result<()> {
        let id = object.id.as_u64();
        match &object.kind {
            ObjectKind::Points(dataset) => self.upload_points(id, dataset, &object.transform),
            ObjectKind::Mesh { mesh, color } => {
                self.upload_solid(id, &[SolidMesh::triangles(mesh, &object.transform, *color)])
            }
            ObjectKind::Arrow(arrow) => self.upload_solid(id, &arrow_parts(arrow, &object.transform)),
        }
        log::trace!("Uploaded {} ({:?})", object.name, object.id);
        Ok(())
    }

    fn update_point_colors(&mut self, id: ObjectId, colors: &[f32]) -> Result<()> {
        self.update_colors(id.as_u64(), colors)
    }

    fn release_object(&mut self, id: ObjectId) {
        self.release(id.as_u64());
    }

    fn resize(&mut self, width: u32, height: u32) {
        PointCloudRenderer::resize(self, width, height);
    }

    fn draw(&mut self, camera: &PerspectiveCamera) -> Result<()> {
        self.render(camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pointpick_core::{Point3f, Ray, Rgb, Vector3f};
    use pointpick_gpu::SolidTopology;

    #[test]
    fn test_arrow_parts() {
        let ray = Ray::new(Point3f::origin(), Vector3f::new(0.0, 0.0, -1.0));
        let arrow = ArrowHelper::new(&ray, 300.0, Rgb::YELLOW).with_head_width(1.0);
        let parts = arrow_parts(&arrow, &Transform3D::identity());

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].topology, SolidTopology::Lines);
        assert_relative_eq!(parts[0].vertices[1].position[2], -240.0);
        assert_eq!(parts[1].topology, SolidTopology::Triangles);
        assert!(!parts[1].is_empty());
    }
}
