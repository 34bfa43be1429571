//! Framing a model in the camera view
//!
//! [`fit`] recenters a model on the world origin and backs the camera off
//! along +Z far enough that the model's largest extent fills the vertical
//! field of view, with some margin. Near and far planes are scaled with the
//! viewing distance so depth precision follows the model size.

use crate::camera::Camera;
use meshview_core::{Bounded, Model, Point3f, Vector3f};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Constants used by [`fit`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Multiplier on the exact framing distance
    pub margin: f32,
    /// `near = distance / near_divisor`
    pub near_divisor: f32,
    /// `far = distance * far_multiplier`
    pub far_multiplier: f32,
    /// Lower bound on the camera distance for flat or point-like models
    pub min_distance: f32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            margin: 1.5,
            near_divisor: 100.0,
            far_multiplier: 100.0,
            min_distance: 0.01,
        }
    }
}

/// What [`fit`] measured and applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    /// Box center before recentering
    pub center: Point3f,
    pub size: Vector3f,
    pub max_dim: f32,
    /// Distance at which `max_dim` exactly spans the field of view
    pub distance: f32,
    /// Distance the camera was placed at
    pub final_distance: f32,
    pub near: f32,
    pub far: f32,
}

/// Recenter `model` on the origin and frame it with `camera`
///
/// Returns `None`, leaving both untouched, when the model has no triangles.
/// The model root is translated permanently; calling this again on the same
/// model yields the same distance and a zero recentering offset.
pub fn fit(model: &mut Model, camera: &mut Camera, config: &FitConfig) -> Option<CameraFit> {
    let aabb = model.bounding_box();
    if aabb.is_empty() {
        return None;
    }

    let center = aabb.center();
    let size = aabb.size();
    model.translate(&-center.coords);

    let max_dim = aabb.max_dimension();
    let fov = camera.fov_radians();
    let distance = (max_dim / 2.0) / (fov / 2.0).tan();

    let mut final_distance = distance * config.margin;
    if !final_distance.is_finite() || final_distance < config.min_distance {
        final_distance = config.min_distance;
    }

    camera.position = Point3f::new(0.0, 0.0, final_distance);
    camera.look_at(Point3f::origin());
    camera.near = final_distance / config.near_divisor;
    camera.far = final_distance * config.far_multiplier;
    camera.update_projection_matrix();

    let result = CameraFit {
        center,
        size,
        max_dim,
        distance,
        final_distance,
        near: camera.near,
        far: camera.far,
    };
    debug!(
        model = model.name(),
        max_dim,
        distance = final_distance,
        near = result.near,
        far = result.far,
        "fitted camera"
    );
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meshview_core::TriangleMesh;

    fn triangle_model(points: [Point3f; 3]) -> Model {
        let mut model = Model::new("tri");
        let root = model.root();
        let mesh = TriangleMesh::from_vertices_and_faces(points.to_vec(), vec![[0, 1, 2]]);
        model.add_node(root, "part", Some(mesh)).unwrap();
        model
    }

    #[test]
    fn test_fit_recenters_model() {
        let mut model = triangle_model([
            Point3f::new(2.0, 2.0, 2.0),
            Point3f::new(4.0, 2.0, 2.0),
            Point3f::new(2.0, 4.0, 2.0),
        ]);
        let mut camera = Camera::default();
        let fit = fit(&mut model, &mut camera, &FitConfig::default()).unwrap();

        assert_relative_eq!(fit.center, Point3f::new(3.0, 3.0, 2.0));
        assert_relative_eq!(model.bounding_box().center(), Point3f::origin());
        assert_relative_eq!(camera.target, Point3f::origin());
        assert_relative_eq!(camera.position.x, 0.0);
        assert_relative_eq!(camera.position.y, 0.0);
        assert_relative_eq!(camera.position.z, fit.final_distance);
    }

    #[test]
    fn test_empty_model_is_untouched() {
        let mut model = Model::new("empty");
        let mut camera = Camera::default();
        let before = camera.position;
        assert!(fit(&mut model, &mut camera, &FitConfig::default()).is_none());
        assert_eq!(camera.position, before);
    }

    #[test]
    fn test_point_like_model_clamps_distance() {
        let p = Point3f::new(1.0, 1.0, 1.0);
        let mut model = triangle_model([p, p, p]);
        let mut camera = Camera::default();
        let config = FitConfig::default();
        let fit = fit(&mut model, &mut camera, &config).unwrap();

        assert_relative_eq!(fit.final_distance, config.min_distance);
        assert!(camera.near > 0.0);
        assert!(camera.near < camera.far);
    }

    #[test]
    fn test_custom_margin() {
        let mut model = triangle_model([
            Point3f::new(-1.0, -1.0, 0.0),
            Point3f::new(1.0, -1.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ]);
        let mut camera = Camera::default();
        let config = FitConfig {
            margin: 1.0,
            ..FitConfig::default()
        };
        let fit = fit(&mut model, &mut camera, &config).unwrap();
        assert_relative_eq!(fit.final_distance, fit.distance);
    }
}
