use crate::objects::Point;
use crate::utils::bounds::BoundingSphere;
use nalgebra::Vector3;

pub type Triangle = (usize, usize, usize);

/// Indexed triangle soup with per-vertex normals and optional UVs.
#[derive(Clone, Default, Debug)]
pub struct TriangleMesh {
    vertices: Vec<Point>,
    normals: Vec<Vector3<f64>>,
    uvs: Vec<[f64; 2]>,
    triangles: Vec<Triangle>,
    bounding_sphere: BoundingSphere,
}

impl TriangleMesh {
    /// Builds a mesh. Missing normals are computed from face geometry;
    /// `uvs` must be empty or have one entry per vertex.
    pub fn new(
        vertices: Vec<Point>,
        normals: Vec<Vector3<f64>>,
        uvs: Vec<[f64; 2]>,
        triangles: Vec<Triangle>,
    ) -> Self {
        debug_assert!(uvs.is_empty() || uvs.len() == vertices.len());
        let bounding_sphere = BoundingSphere::from_points(&vertices);
        let mut mesh = Self {
            vertices,
            normals,
            uvs,
            triangles,
            bounding_sphere,
        };
        if !mesh.has_normals() {
            mesh.compute_normals();
        }
        mesh
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    pub fn uv(&self, index: usize) -> Option<[f64; 2]> {
        self.uvs.get(index).copied()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        self.normals.len() == self.vertices.len() && !self.normals.is_empty()
    }

    pub fn bounding_sphere(&self) -> &BoundingSphere {
        &self.bounding_sphere
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangle_points(&self, triangle: &Triangle) -> [Point; 3] {
        [
            self.vertices[triangle.0],
            self.vertices[triangle.1],
            self.vertices[triangle.2],
        ]
    }

    /// Area-weighted vertex normals.
    fn compute_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];
        for tri in &self.triangles {
            let [a, b, c] = self.triangle_points(tri);
            let face = (b - a).cross(&(c - a));
            normals[tri.0] += face;
            normals[tri.1] += face;
            normals[tri.2] += face;
        }
        for n in &mut normals {
            *n = n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::y);
        }
        self.normals = normals;
    }
}
