//! 3D transformation utilities

use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// An affine transformation stored as a homogeneous matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(translation: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }

    /// Translation component of the transformation
    pub fn translation_part(&self) -> Vector3<f32> {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Shift the transformation by `offset` in the parent frame
    pub fn translate(&mut self, offset: &Vector3<f32>) {
        for row in 0..3 {
            self.matrix[(row, 3)] += offset[row];
        }
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Apply the transformation to a vector
    pub fn transform_vector(&self, vector: &Vector3<f32>) -> Vector3<f32> {
        self.matrix.fixed_view::<3, 3>(0, 0) * vector
    }

    /// Compose this transformation with another (`self` applied last)
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl From<Matrix4<f32>> for Transform3D {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_translate_accumulates() {
        let mut t = Transform3D::identity();
        t.translate(&Vector3::new(1.0, 2.0, 3.0));
        t.translate(&Vector3::new(-1.0, 0.5, 0.0));
        assert_relative_eq!(t.translation_part(), Vector3::new(0.0, 2.5, 3.0));

        let p = t.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point3::new(1.0, 3.5, 4.0));
    }

    #[test]
    fn test_compose_order() {
        let scale = Transform3D::from(Matrix4::new_scaling(2.0));
        let shift = Transform3D::translation(Vector3::new(1.0, 0.0, 0.0));

        // scale first, then shift
        let p = (shift * scale).transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_vectors_ignore_translation() {
        let t = Transform3D::translation(Vector3::new(5.0, 5.0, 5.0));
        let v = t.transform_vector(&Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(v, Vector3::new(0.0, 1.0, 0.0));
    }
}
