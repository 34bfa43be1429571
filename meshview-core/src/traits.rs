//! Core traits for meshview

use crate::{bounds::Aabb, mesh::TriangleMesh, point::*, transform::Transform3D};

/// Trait for objects with a spatial extent
pub trait Bounded {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> Aabb;

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        self.bounding_box().center()
    }
}

impl Bounded for TriangleMesh {
    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }
}

impl TriangleMesh {
    /// Bounding box of the mesh after applying `transform`
    pub fn transformed_bounding_box(&self, transform: &Transform3D) -> Aabb {
        let mut aabb = Aabb::empty();
        for vertex in &self.vertices {
            aabb.expand_by_point(&transform.transform_point(vertex));
        }
        aabb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mesh_bounds_and_center() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(2.0, 0.0, 0.0),
                Point3f::new(0.0, 4.0, 2.0),
            ],
            vec![[0, 1, 2]],
        );
        let aabb = mesh.bounding_box();
        assert_eq!(aabb.max, Point3f::new(2.0, 4.0, 2.0));
        assert_relative_eq!(mesh.center(), Point3f::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_transformed_bounds() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![Point3f::new(1.0, 1.0, 1.0), Point3f::new(2.0, 2.0, 2.0)],
            vec![],
        );
        let shift = Transform3D::translation(Vector3f::new(-1.0, 0.0, 2.0));
        let aabb = mesh.transformed_bounding_box(&shift);
        assert_eq!(aabb.min, Point3f::new(0.0, 1.0, 3.0));
        assert_eq!(aabb.max, Point3f::new(1.0, 2.0, 4.0));
    }
}
