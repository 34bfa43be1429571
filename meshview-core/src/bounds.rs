//! Axis-aligned bounding boxes

use crate::point::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
///
/// The empty box has `min = +inf` and `max = -inf` so that expanding it by
/// any point yields a box containing exactly that point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3f,
    pub max: Point3f,
}

impl Aabb {
    /// Create a box from two corners
    pub fn new(min: Point3f, max: Point3f) -> Self {
        Self { min, max }
    }

    /// The empty box
    pub fn empty() -> Self {
        Self {
            min: Point3f::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3f::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Smallest box enclosing all `points`
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3f>,
    {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand_by_point(point);
        }
        aabb
    }

    /// True if the box encloses no point at all
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Grow the box to include `point`
    pub fn expand_by_point(&mut self, point: &Point3f) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Grow the box to include `other`
    pub fn union(&mut self, other: &Aabb) {
        if other.is_empty() {
            return;
        }
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Center of the box, the origin for an empty box
    pub fn center(&self) -> Point3f {
        if self.is_empty() {
            return Point3f::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis, zero for an empty box
    pub fn size(&self) -> Vector3f {
        if self.is_empty() {
            return Vector3f::zeros();
        }
        self.max - self.min
    }

    /// Largest of the three extents
    pub fn max_dimension(&self) -> f32 {
        self.size().max()
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}
