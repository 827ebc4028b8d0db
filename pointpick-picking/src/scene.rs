//! Flat scene graph holding the pickable and decorative objects

use pointpick_core::{PointDataset, Ray, Rgb, Transform3D, TriangleMesh, Point3f, Vector3f};

/// Identity of an object within a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Debug visualization of a ray: a shaft ending in a cone head
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowHelper {
    pub origin: Point3f,
    pub direction: Vector3f,
    pub length: f32,
    pub color: Rgb,
    pub head_length: f32,
    pub head_width: f32,
}

impl ArrowHelper {
    /// Arrow along `ray` with a head a fifth of its length
    pub fn new(ray: &Ray, length: f32, color: Rgb) -> Self {
        let head_length = 0.2 * length;
        Self {
            origin: ray.origin,
            direction: ray.direction,
            length,
            color,
            head_length,
            head_width: 0.2 * head_length,
        }
    }

    pub fn with_head_width(mut self, head_width: f32) -> Self {
        self.head_width = head_width;
        self
    }

    /// Where the shaft ends and the head starts
    pub fn shaft_end(&self) -> Point3f {
        self.origin + self.direction * (self.length - self.head_length).max(0.0)
    }

    pub fn tip(&self) -> Point3f {
        self.origin + self.direction * self.length
    }

    /// Cone geometry of the head
    pub fn head_mesh(&self, radial_segments: usize) -> TriangleMesh {
        TriangleMesh::cone(self.shaft_end(), self.tip(), self.head_width * 0.5, radial_segments)
    }
}

/// What a scene object is
#[derive(Debug, Clone)]
pub enum ObjectKind {
    /// A point cloud; the only kind points can be picked from
    Points(PointDataset),
    /// A solid unlit mesh
    Mesh { mesh: TriangleMesh, color: Rgb },
    /// A ray visualization; never hit by ray casts
    Arrow(ArrowHelper),
}

/// An object placed in the scene
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub transform: Transform3D,
    pub kind: ObjectKind,
}

impl SceneObject {
    /// Whether ray casts consider this object
    pub fn is_pickable(&self) -> bool {
        !matches!(self.kind, ObjectKind::Arrow(_))
    }

    pub fn as_points(&self) -> Option<&PointDataset> {
        match &self.kind {
            ObjectKind::Points(dataset) => Some(dataset),
            _ => None,
        }
    }

    pub fn as_points_mut(&mut self) -> Option<&mut PointDataset> {
        match &mut self.kind {
            ObjectKind::Points(dataset) => Some(dataset),
            _ => None,
        }
    }
}

/// Ordered collection of scene objects
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object with an identity transform and return its id
    pub fn add(&mut self, name: impl Into<String>, kind: ObjectKind) -> ObjectId {
        self.add_with_transform(name, kind, Transform3D::identity())
    }

    pub fn add_with_transform(
        &mut self,
        name: impl Into<String>,
        kind: ObjectKind,
        transform: Transform3D,
    ) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(SceneObject {
            id,
            name: name.into(),
            transform,
            kind,
        });
        id
    }

    /// Remove an object, handing it back to the caller
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let position = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(position))
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Point dataset of object `id`, if it is a point cloud
    pub fn points(&self, id: ObjectId) -> Option<&PointDataset> {
        self.get(id)?.as_points()
    }

    pub fn points_mut(&mut self, id: ObjectId) -> Option<&mut PointDataset> {
        self.get_mut(id)?.as_points_mut()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SceneObject> {
        self.objects.iter()
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|o| o.id).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of arrow helpers currently in the scene
    pub fn arrow_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|o| matches!(o.kind, ObjectKind::Arrow(_)))
            .count()
    }
}

impl<'a> IntoIterator for &'a Scene {
    type Item = &'a SceneObject;
    type IntoIter = std::slice::Iter<'a, SceneObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}
