//! Integration tests for meshview-viewer
//!
//! These drive the viewer the way the window does: load an OBJ file, fit
//! the camera, click on parts and hide or unhide them.

use approx::assert_relative_eq;
use meshview_core::{Bounded, Model, NodeId, Point3f, TriangleMesh};
use meshview_io::ModelSource;
use meshview_viewer::*;
use std::time::Duration;

/// Two stacked cubes as separate OBJ objects, spanning (-1,-1,-1)..(1,1,1)
const TWO_BOXES: &str = "\
o lower
v -1 -1 -1
v  1 -1 -1
v  1  0 -1
v -1  0 -1
v -1 -1  1
v  1 -1  1
v  1  0  1
v -1  0  1
f 1 2 3 4
f 5 6 7 8
f 1 2 6 5
f 4 3 7 8
f 1 4 8 5
f 2 3 7 6
o upper
v -1 0 -1
v  1 0 -1
v  1 1 -1
v -1 1 -1
v -1 0  1
v  1 0  1
v  1 1  1
v -1 1  1
f 9 10 11 12
f 13 14 15 16
f 9 10 14 13
f 12 11 15 16
f 9 12 16 13
f 10 11 15 14
";

fn two_boxes() -> Model {
    ModelSource::bytes("boxes.obj", TWO_BOXES.as_bytes().to_vec())
        .load()
        .unwrap()
}

fn part(model: &Model, name: &str) -> NodeId {
    model
        .traverse()
        .find(|n| n.name == name)
        .map(|n| n.id())
        .unwrap()
}

/// A box of edge `size` centered at `center`, as a single part
fn cube(size: f32, center: Point3f) -> Model {
    let h = size / 2.0;
    let mut vertices = Vec::new();
    for &x in &[-h, h] {
        for &y in &[-h, h] {
            for &z in &[-h, h] {
                vertices.push(center + nalgebra::Vector3::new(x, y, z));
            }
        }
    }
    let faces = vec![
        [0, 1, 3], [0, 3, 2], [4, 6, 7], [4, 7, 5],
        [0, 4, 5], [0, 5, 1], [2, 3, 7], [2, 7, 6],
        [0, 2, 6], [0, 6, 4], [1, 5, 7], [1, 7, 3],
    ];
    let mut model = Model::new("cube");
    let root = model.root();
    model
        .add_node(root, "cube", Some(TriangleMesh::from_vertices_and_faces(vertices, faces)))
        .unwrap();
    model
}

#[test]
fn test_unit_box_framing_at_75_degrees() {
    let mut model = two_boxes();
    let mut camera = Camera::default();
    assert_relative_eq!(camera.fov, 75.0);

    let fit = fit(&mut model, &mut camera, &FitConfig::default()).unwrap();
    assert_relative_eq!(fit.max_dim, 2.0, epsilon = 1e-6);
    assert_relative_eq!(camera.fov_radians(), 1.309, epsilon = 1e-3);

    let distance = 1.0 / 0.6544985_f32.tan();
    assert_relative_eq!(fit.distance, distance, epsilon = 1e-4);
    assert_relative_eq!(fit.distance, 1.3032, epsilon = 1e-3);
    assert_relative_eq!(fit.final_distance, 1.5 * distance, epsilon = 1e-4);
    assert_relative_eq!(fit.final_distance, 1.9548, epsilon = 1e-3);
    assert_relative_eq!(camera.near, fit.final_distance / 100.0, epsilon = 1e-6);
    assert_relative_eq!(camera.far, fit.final_distance * 100.0, epsilon = 1e-2);
    assert_relative_eq!(camera.position, Point3f::new(0.0, 0.0, fit.final_distance));
}

#[test]
fn test_fit_planes_positive_for_any_size_and_fov() {
    for &size in &[1e-4_f32, 0.01, 1.0, 37.5, 1e4] {
        for &fov in &[5.0_f32, 45.0, 75.0, 120.0, 175.0] {
            let mut model = cube(size, Point3f::new(size, -size, 3.0));
            let mut camera = Camera::default();
            camera.fov = fov;
            let fit = fit(&mut model, &mut camera, &FitConfig::default()).unwrap();

            assert!(fit.final_distance > 0.0, "size {} fov {}", size, fov);
            assert!(camera.near > 0.0, "size {} fov {}", size, fov);
            assert!(camera.near < camera.far, "size {} fov {}", size, fov);
        }
    }
}

#[test]
fn test_fit_twice_is_fixed_point() {
    let mut model = cube(3.0, Point3f::new(5.0, 1.0, -2.0));
    let mut camera = Camera::default();
    let config = FitConfig::default();

    let first = fit(&mut model, &mut camera, &config).unwrap();
    let second = fit(&mut model, &mut camera, &config).unwrap();
    assert_relative_eq!(first.final_distance, second.final_distance, epsilon = 1e-5);
    assert_relative_eq!(second.center, Point3f::origin(), epsilon = 1e-5);
    assert_relative_eq!(model.bounding_box().center(), Point3f::origin(), epsilon = 1e-5);
}

#[test]
fn test_click_selects_part_under_cursor() {
    let mut viewer = Viewer::default();
    viewer.resize(800, 800);
    viewer.set_model(two_boxes());
    let model = viewer.model().unwrap();
    let (lower, upper) = (part(model, "lower"), part(model, "upper"));

    assert_eq!(viewer.click(400.0, 300.0), Some(upper));
    assert_eq!(viewer.click(400.0, 500.0), Some(lower));
    assert_eq!(viewer.selection(), Some(lower));
}

#[test]
fn test_pick_is_deterministic() {
    let mut model = two_boxes();
    let mut camera = Camera::default();
    camera.set_viewport(640, 480);
    fit(&mut model, &mut camera, &FitConfig::default()).unwrap();

    let first = pick(320.0, 240.0, 640.0, 480.0, &camera, &model);
    assert!(first.is_some());
    for _ in 0..10 {
        assert_eq!(pick(320.0, 240.0, 640.0, 480.0, &camera, &model), first);
    }
}

#[test]
fn test_hidden_part_can_still_be_picked_and_unhidden() {
    let mut viewer = Viewer::default();
    viewer.resize(800, 800);
    viewer.set_model(two_boxes());
    let upper = part(viewer.model().unwrap(), "upper");

    assert_eq!(viewer.click(400.0, 300.0), Some(upper));
    assert_eq!(viewer.toggle_selected(), ToggleOutcome::Hidden(upper));
    assert!(!viewer.model().unwrap().is_visible(upper));

    viewer.select(None);
    assert_eq!(viewer.click(400.0, 300.0), Some(upper));
    assert_eq!(viewer.toggle_label(), "Unhide Selected");
    assert_eq!(viewer.toggle_selected(), ToggleOutcome::Shown(upper));
    assert!(viewer.hidden().is_consistent(viewer.model().unwrap()));
}

#[test]
fn test_toggle_round_trip() {
    let mut model = two_boxes();
    let a = part(&model, "lower");
    let mut hidden = VisibilitySet::new();

    assert!(hidden.is_empty());
    assert_eq!(hidden.toggle(&mut model, Some(a)), ToggleOutcome::Hidden(a));
    assert_eq!(hidden.iter().collect::<Vec<_>>(), vec![a]);
    assert!(!model.is_visible(a));

    assert_eq!(hidden.toggle(&mut model, Some(a)), ToggleOutcome::Shown(a));
    assert!(hidden.is_empty());
    assert!(model.is_visible(a));
}

#[test]
fn test_unhide_all_clears_hidden_set() {
    let mut model = two_boxes();
    let (a, b) = (part(&model, "lower"), part(&model, "upper"));
    let mut hidden = VisibilitySet::new();
    hidden.toggle(&mut model, Some(a));
    hidden.toggle(&mut model, Some(b));
    assert_eq!(hidden.len(), 2);

    hidden.unhide_all(&mut model);
    assert!(model.is_visible(a));
    assert!(model.is_visible(b));
    assert!(hidden.is_empty());
    assert!(hidden.is_consistent(&model));
}

#[test]
fn test_new_model_resets_selection_and_hidden_parts() {
    let mut viewer = Viewer::default();
    viewer.resize(800, 800);
    viewer.set_model(two_boxes());
    viewer.click(400.0, 300.0).unwrap();
    viewer.toggle_selected();
    assert_eq!(viewer.hidden().len(), 1);

    viewer.set_model(cube(1.0, Point3f::origin()));
    assert_eq!(viewer.selection(), None);
    assert!(viewer.hidden().is_empty());
}

#[test]
fn test_last_requested_load_wins() {
    let loader = ModelLoader::new().unwrap();
    let mut viewer = Viewer::default();

    let first = viewer.begin_load("boxes");
    loader.spawn(first, ModelSource::bytes("boxes.obj", TWO_BOXES.as_bytes().to_vec()));
    let second = viewer.begin_load("triangle");
    loader.spawn(
        second,
        ModelSource::bytes("triangle.obj", b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n".to_vec()),
    );

    let mut outcomes = Vec::new();
    while outcomes.len() < 2 {
        let done = loader.wait(Duration::from_secs(10)).unwrap();
        let ticket = done.ticket;
        outcomes.push((ticket, viewer.apply(done)));
    }

    for (ticket, outcome) in outcomes {
        if ticket == first {
            assert_eq!(outcome, LoadOutcome::Stale);
        } else {
            assert!(matches!(outcome, LoadOutcome::Applied(Some(_))));
        }
    }
    assert_eq!(viewer.model().unwrap().name(), "triangle");
    assert_eq!(viewer.status(), &LoadStatus::Loaded { label: "triangle".to_string() });
}

#[test]
fn test_failed_background_load_keeps_model() {
    let loader = ModelLoader::new().unwrap();
    let mut viewer = Viewer::default();
    viewer.set_model(two_boxes());
    let revision = viewer.revision();

    let ticket = viewer.begin_load("empty.obj");
    loader.spawn(ticket, ModelSource::bytes("empty.obj", Vec::new()));
    let outcome = viewer.apply(loader.wait(Duration::from_secs(10)).unwrap());

    assert!(matches!(outcome, LoadOutcome::Failed(_)));
    assert_eq!(viewer.model().unwrap().name(), "boxes");
    assert_eq!(viewer.revision(), revision);
}
