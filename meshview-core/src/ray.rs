//! Rays and ray intersection tests

use crate::bounds::Aabb;
use crate::point::*;
use serde::{Deserialize, Serialize};

/// Tolerance below which a ray is treated as parallel to a triangle
const PARALLEL_EPSILON: f32 = 1e-8;

/// Minimum hit distance, rejects hits at or behind the origin
const MIN_HIT_DISTANCE: f32 = 1e-7;

/// A half-line in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Point3f,
    /// Unit direction
    pub direction: Vector3f,
}

impl Ray {
    /// Create a ray, normalizing `direction`
    ///
    /// Returns `None` for a zero-length direction.
    pub fn new(origin: Point3f, direction: Vector3f) -> Option<Self> {
        direction
            .try_normalize(f32::EPSILON)
            .map(|direction| Self { origin, direction })
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Point3f {
        self.origin + self.direction * t
    }

    /// Möller-Trumbore ray/triangle test
    ///
    /// Both faces are hit. Returns the distance along the ray.
    pub fn intersect_triangle(&self, triangle: &[Point3f; 3]) -> Option<f32> {
        let [v0, v1, v2] = triangle;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(&edge2);
        let a = edge1.dot(&h);

        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * self.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (t > MIN_HIT_DISTANCE).then_some(t)
    }

    /// Slab test against an axis-aligned box
    ///
    /// Returns the entry distance, or zero when the origin is inside the box.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        if aabb.is_empty() {
            return None;
        }

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let inv = 1.0 / self.direction[axis];
            let mut t0 = (aabb.min[axis] - self.origin[axis]) * inv;
            let mut t1 = (aabb.max[axis] - self.origin[axis]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            // NaN from 0 * inf when the origin lies on a slab plane of a flat box
            if t0.is_nan() || t1.is_nan() {
                if self.origin[axis] < aabb.min[axis] || self.origin[axis] > aabb.max[axis] {
                    return None;
                }
                continue;
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
        }

        if t_max < 0.0 || t_min > t_max {
            return None;
        }
        Some(t_min.max(0.0))
    }
}
