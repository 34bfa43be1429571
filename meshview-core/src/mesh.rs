//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    /// Unit normal of each face, parallel to `faces`
    pub normals: Option<Vec<Vector3f>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
        }
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

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    ///
    /// Stored normals no longer line up with the faces and are dropped.
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
        self.normals = None;
    }

    /// Corner positions of face `index`
    pub fn triangle(&self, index: usize) -> [Point3f; 3] {
        let [a, b, c] = self.faces[index];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Iterate over the corner positions of every face
    pub fn triangles(&self) -> impl Iterator<Item = [Point3f; 3]> + '_ {
        (0..self.faces.len()).map(move |i| self.triangle(i))
    }

    /// Check that every face index refers to an existing vertex
    pub fn validate(&self) -> Result<()> {
        let count = self.vertices.len();
        for (i, face) in self.faces.iter().enumerate() {
            if let Some(bad) = face.iter().find(|&&v| v >= count) {
                return Err(Error::InvalidData(format!(
                    "face {} references vertex {} but mesh has {} vertices",
                    i, bad, count
                )));
            }
        }
        Ok(())
    }

    /// Calculate face normals
    ///
    /// Degenerate faces get a zero normal instead of NaN.
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.triangles().map(|t| unit_normal(&t)).collect()
    }

    /// Store face normals, ignored unless there is one per face
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.faces.len() {
            self.normals = Some(normals);
        }
    }

    /// Compute and store the face normals
    pub fn compute_normals(&mut self) {
        let normals = self.calculate_face_normals();
        self.set_normals(normals);
    }

    /// Normal of face `index`, from the stored normals when present
    pub fn face_normal(&self, index: usize) -> Vector3f {
        if let Some(normal) = self.normals.as_ref().and_then(|n| n.get(index)) {
            return *normal;
        }
        unit_normal(&self.triangle(index))
    }
}

fn unit_normal([v0, v1, v2]: &[Point3f; 3]) -> Vector3f {
    (v1 - v0)
        .cross(&(v2 - v0))
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3f::zeros)
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
