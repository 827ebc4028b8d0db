//! Flat-colored geometry for meshes and line segments

use bytemuck::{Pod, Zeroable};
use pointpick_core::{Point3f, Rgb, Transform3D, TriangleMesh};

/// Vertex of unlit solid geometry
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SolidVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl SolidVertex {
    pub fn new(position: &Point3f, color: Rgb) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            color: color.to_array(),
        }
    }

    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SolidVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Color
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolidTopology {
    Triangles,
    Lines,
}

/// CPU-side geometry ready to be uploaded as one draw call
#[derive(Debug, Clone, PartialEq)]
pub struct SolidMesh {
    pub vertices: Vec<SolidVertex>,
    pub indices: Vec<u32>,
    pub topology: SolidTopology,
}

impl SolidMesh {
    /// Triangles of `mesh` placed by `transform` and painted `color`
    pub fn triangles(mesh: &TriangleMesh, transform: &Transform3D, color: Rgb) -> Self {
        let vertices = mesh
            .vertices
            .iter()
            .map(|v| SolidVertex::new(&transform.transform_point(v), color))
            .collect();

        Self {
            vertices,
            indices: mesh.index_buffer(),
            topology: SolidTopology::Triangles,
        }
    }

    /// A single line segment
    pub fn line(start: &Point3f, end: &Point3f, color: Rgb) -> Self {
        Self {
            vertices: vec![SolidVertex::new(start, color), SolidVertex::new(end, color)],
            indices: vec![0, 1],
            topology: SolidTopology::Lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointpick_core::Vector3f;

    #[test]
    fn test_triangles_follow_transform() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let transform = Transform3D::translation(Vector3f::new(0.0, 0.0, 5.0));
        let solid = SolidMesh::triangles(&mesh, &transform, Rgb::from_hex(0x3322ff));

        assert_eq!(solid.topology, SolidTopology::Triangles);
        assert_eq!(solid.indices, vec![0, 1, 2]);
        assert_eq!(solid.vertices[1].position, [1.0, 0.0, 5.0]);
        assert_eq!(solid.vertices[0].color, Rgb::from_hex(0x3322ff).to_array());
    }

    #[test]
    fn test_sphere_index_count() {
        let sphere = TriangleMesh::uv_sphere(2.0, 32, 32);
        let solid = SolidMesh::triangles(&sphere, &Transform3D::identity(), Rgb::WHITE);
        assert_eq!(solid.indices.len(), sphere.face_count() * 3);
        assert!(!solid.is_empty());
    }

    #[test]
    fn test_line() {
        let line = SolidMesh::line(&Point3f::origin(), &Point3f::new(0.0, 0.0, -300.0), Rgb::YELLOW);
        assert_eq!(line.topology, SolidTopology::Lines);
        assert_eq!(line.vertices.len(), 2);
        assert_eq!(line.indices, vec![0, 1]);
    }

    #[test]
    fn test_vertex_layout_stride() {
        assert_eq!(std::mem::size_of::<SolidVertex>(), 24);
        assert_eq!(SolidVertex::desc().array_stride, 24);
    }
}
