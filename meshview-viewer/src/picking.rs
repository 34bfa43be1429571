//! Screen-space picking of model parts

use crate::camera::Camera;
use meshview_core::{Model, NodeId, Point3f, Ray};
use nalgebra::{Point2, Point3};
use std::cmp::Ordering;
use tracing::debug;

/// Options for [`intersect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickOptions {
    /// Test nodes that are hidden or have a hidden ancestor
    pub include_hidden: bool,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            include_hidden: true,
        }
    }
}

/// The nearest ray hit on one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    /// Distance from the ray origin
    pub distance: f32,
    pub point: Point3f,
    /// Index of the hit triangle within the node's mesh
    pub face: usize,
}

/// Convert a pointer position in pixels to normalized device coordinates
///
/// Returns `None` for a zero-sized viewport.
pub fn pointer_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Option<Point2<f32>> {
    if !(width > 0.0 && height > 0.0) {
        return None;
    }
    Some(Point2::new(x / width * 2.0 - 1.0, -(y / height) * 2.0 + 1.0))
}

/// World-space ray from the camera through a point in NDC
pub fn camera_ray(camera: &Camera, ndc: Point2<f32>) -> Option<Ray> {
    let inverse = camera.view_projection().try_inverse()?;
    let through = inverse.transform_point(&Point3::new(ndc.x, ndc.y, 0.5));
    Ray::new(camera.position, through - camera.position)
}

/// Every node hit along `ray`, nearest first
///
/// Each node reports only its closest triangle, so a ray through an edge
/// shared by two triangles still yields one hit. Hits at equal distance are
/// ordered by ascending node id.
pub fn intersect(ray: &Ray, model: &Model, options: PickOptions) -> Vec<Hit> {
    let mut hits = Vec::new();
    for (node, mesh, world) in model.mesh_nodes() {
        if !options.include_hidden && !model.is_rendered(node) {
            continue;
        }
        if ray
            .intersect_aabb(&mesh.transformed_bounding_box(&world))
            .is_none()
        {
            continue;
        }

        let mut nearest: Option<(usize, f32)> = None;
        for (face, triangle) in mesh.triangles().enumerate() {
            let triangle = triangle.map(|p| world.transform_point(&p));
            if let Some(distance) = ray.intersect_triangle(&triangle) {
                if nearest.map_or(true, |(_, best)| distance < best) {
                    nearest = Some((face, distance));
                }
            }
        }
        if let Some((face, distance)) = nearest {
            hits.push(Hit {
                node,
                distance,
                point: ray.at(distance),
                face,
            });
        }
    }

    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
            .then(a.node.cmp(&b.node))
    });
    hits
}

/// The node under a pointer position, hidden nodes included
pub fn pick(
    pointer_x: f32,
    pointer_y: f32,
    viewport_width: f32,
    viewport_height: f32,
    camera: &Camera,
    model: &Model,
) -> Option<NodeId> {
    pick_with(
        pointer_x,
        pointer_y,
        viewport_width,
        viewport_height,
        camera,
        model,
        PickOptions::default(),
    )
}

/// [`pick`] with explicit options
pub fn pick_with(
    pointer_x: f32,
    pointer_y: f32,
    viewport_width: f32,
    viewport_height: f32,
    camera: &Camera,
    model: &Model,
    options: PickOptions,
) -> Option<NodeId> {
    let ndc = pointer_to_ndc(pointer_x, pointer_y, viewport_width, viewport_height)?;
    let ray = camera_ray(camera, ndc)?;
    let hit = intersect(&ray, model, options).into_iter().next();
    debug!(x = pointer_x, y = pointer_y, node = ?hit.map(|h| h.node), "pick");
    hit.map(|h| h.node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meshview_core::{Transform3D, TriangleMesh, Vector3f};

    fn quad(z: f32) -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(-1.0, -1.0, z),
                Point3f::new(1.0, -1.0, z),
                Point3f::new(1.0, 1.0, z),
                Point3f::new(-1.0, 1.0, z),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_ndc_mapping() {
        let center = pointer_to_ndc(400.0, 300.0, 800.0, 600.0).unwrap();
        assert_relative_eq!(center, Point2::new(0.0, 0.0));
        let top_left = pointer_to_ndc(0.0, 0.0, 800.0, 600.0).unwrap();
        assert_relative_eq!(top_left, Point2::new(-1.0, 1.0));
        assert!(pointer_to_ndc(1.0, 1.0, 0.0, 600.0).is_none());
    }

    #[test]
    fn test_center_ray_looks_down_axis() {
        let camera = Camera::default();
        let ray = camera_ray(&camera, Point2::origin()).unwrap();
        assert_relative_eq!(ray.origin, camera.position);
        assert_relative_eq!(ray.direction, -Vector3f::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_nearest_node_wins() {
        let mut model = Model::new("layers");
        let root = model.root();
        let back = model.add_node(root, "back", Some(quad(-1.0))).unwrap();
        let front = model.add_node(root, "front", Some(quad(1.0))).unwrap();
        let camera = Camera::default();

        let ray = camera_ray(&camera, Point2::origin()).unwrap();
        let hits = intersect(&ray, &model, PickOptions::default());
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, front);
        assert_eq!(hits[1].node, back);
        assert_relative_eq!(hits[0].distance, 4.0, epsilon = 1e-4);

        assert_eq!(pick(400.0, 300.0, 800.0, 600.0, &camera, &model), Some(front));
    }

    #[test]
    fn test_shared_edge_reports_node_once() {
        let mut model = Model::new("quad");
        let root = model.root();
        let part = model.add_node(root, "part", Some(quad(0.0))).unwrap();
        let camera = Camera::default();

        // the center ray runs through the diagonal both triangles share
        let ray = camera_ray(&camera, Point2::origin()).unwrap();
        let hits = intersect(&ray, &model, PickOptions::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, part);
        assert_relative_eq!(hits[0].point, Point3f::origin(), epsilon = 1e-4);
    }

    #[test]
    fn test_equal_distance_prefers_lower_id() {
        let mut model = Model::new("twins");
        let root = model.root();
        let first = model.add_node(root, "first", Some(quad(0.0))).unwrap();
        model.add_node(root, "second", Some(quad(0.0))).unwrap();
        let camera = Camera::default();
        assert_eq!(pick(400.0, 300.0, 800.0, 600.0, &camera, &model), Some(first));
    }

    #[test]
    fn test_hidden_nodes_are_pickable_unless_excluded() {
        let mut model = Model::new("hidden");
        let root = model.root();
        let front = model.add_node(root, "front", Some(quad(1.0))).unwrap();
        let back = model.add_node(root, "back", Some(quad(-1.0))).unwrap();
        model.set_visible(front, false);
        let camera = Camera::default();

        assert_eq!(pick(400.0, 300.0, 800.0, 600.0, &camera, &model), Some(front));
        let visible_only = PickOptions {
            include_hidden: false,
        };
        assert_eq!(
            pick_with(400.0, 300.0, 800.0, 600.0, &camera, &model, visible_only),
            Some(back)
        );
    }

    #[test]
    fn test_miss_and_world_transform() {
        let mut model = Model::new("offset");
        let root = model.root();
        let part = model.add_node(root, "part", Some(quad(0.0))).unwrap();
        model.node_mut(part).unwrap().transform =
            Transform3D::translation(Vector3f::new(10.0, 0.0, 0.0));
        let camera = Camera::default();
        assert_eq!(pick(400.0, 300.0, 800.0, 600.0, &camera, &model), None);
    }
}
