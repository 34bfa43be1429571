//! Scene graph for a loaded model
//!
//! A [`Model`] owns its nodes in an arena. Node ids are assigned densely at
//! insertion time and never reused, so they stay valid for the lifetime of
//! the model. A parent is always inserted before its children, which lets
//! world transforms be computed in a single pass over the arena.

use crate::bounds::Aabb;
use crate::error::{Error, Result};
use crate::mesh::TriangleMesh;
use crate::point::*;
use crate::traits::Bounded;
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a node within one [`Model`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the scene graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub name: String,
    /// Transform relative to the parent node
    pub transform: Transform3D,
    pub visible: bool,
    pub mesh: Option<TriangleMesh>,
}

impl SceneNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// True if the node carries at least one triangle
    pub fn has_geometry(&self) -> bool {
        self.mesh.as_ref().is_some_and(|mesh| !mesh.is_empty())
    }
}

/// A loaded model: a root node and its subtree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    name: String,
    nodes: Vec<SceneNode>,
}

impl Model {
    /// Create a model holding only an empty root node
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let root = SceneNode {
            id: NodeId(0),
            parent: None,
            children: Vec::new(),
            name: name.clone(),
            transform: Transform3D::identity(),
            visible: true,
            mesh: None,
        };
        Self {
            name,
            nodes: vec![root],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.index())
    }

    /// Insert a node under `parent` and return its id
    ///
    /// Fails if the parent is unknown or a face of `mesh` points past its
    /// vertex list.
    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        mesh: Option<TriangleMesh>,
    ) -> Result<NodeId> {
        if !self.contains(parent) {
            return Err(Error::InvalidData(format!("parent node {} does not exist", parent)));
        }
        if let Some(mesh) = &mesh {
            mesh.validate()?;
        }
        let id = u32::try_from(self.nodes.len())
            .map(NodeId)
            .map_err(|_| Error::InvalidData("too many scene nodes".to_string()))?;

        self.nodes.push(SceneNode {
            id,
            parent: Some(parent),
            children: Vec::new(),
            name: name.into(),
            transform: Transform3D::identity(),
            visible: true,
            mesh,
        });
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Depth-first, pre-order walk of the whole subtree starting at the root
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            model: self,
            stack: vec![self.root()],
        }
    }

    /// Set the visibility flag of one node; returns false for an unknown id
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    /// The node's own visibility flag
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.visible)
    }

    /// True if the node and every ancestor are visible, i.e. it gets drawn
    pub fn is_rendered(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.node(id)) {
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        current.is_none() && self.contains(id)
    }

    /// Force every node of the subtree visible
    pub fn show_all(&mut self) {
        for node in &mut self.nodes {
            node.visible = true;
        }
    }

    /// World transform of every node, indexed by node id
    pub fn world_transforms(&self) -> Vec<Transform3D> {
        let mut world: Vec<Transform3D> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let transform = match node.parent {
                Some(parent) => world[parent.index()] * node.transform,
                None => node.transform,
            };
            world.push(transform);
        }
        world
    }

    /// Every mesh-bearing node with its world transform, in traversal order
    pub fn mesh_nodes(&self) -> Vec<(NodeId, &TriangleMesh, Transform3D)> {
        let world = self.world_transforms();
        self.traverse()
            .filter_map(|node| {
                node.mesh
                    .as_ref()
                    .filter(|mesh| !mesh.is_empty())
                    .map(|mesh| (node.id, mesh, world[node.id.index()]))
            })
            .collect()
    }

    /// True if any node carries a triangle
    pub fn has_geometry(&self) -> bool {
        self.nodes.iter().any(SceneNode::has_geometry)
    }

    /// Translation of the root node
    pub fn position(&self) -> Vector3f {
        self.nodes[0].transform.translation_part()
    }

    /// Move the whole model by `offset`
    pub fn translate(&mut self, offset: &Vector3f) {
        self.nodes[0].transform.translate(offset);
    }

    pub fn vertex_count(&self) -> usize {
        self.nodes
            .iter()
            .filter_map(|node| node.mesh.as_ref())
            .map(TriangleMesh::vertex_count)
            .sum()
    }

    pub fn face_count(&self) -> usize {
        self.nodes
            .iter()
            .filter_map(|node| node.mesh.as_ref())
            .map(TriangleMesh::face_count)
            .sum()
    }
}

impl Bounded for Model {
    /// World-space box over every mesh in the subtree, hidden nodes included
    fn bounding_box(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for (_, mesh, world) in self.mesh_nodes() {
            aabb.union(&mesh.transformed_bounding_box(&world));
        }
        aabb
    }
}

/// Iterator returned by [`Model::traverse`]
pub struct Traverse<'a> {
    model: &'a Model,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a SceneNode;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.model.node(id)?;
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad(z: f32) -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, z),
                Point3f::new(1.0, 0.0, z),
                Point3f::new(1.0, 1.0, z),
                Point3f::new(0.0, 1.0, z),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    fn two_part_model() -> (Model, NodeId, NodeId) {
        let mut model = Model::new("parts");
        let root = model.root();
        let a = model.add_node(root, "a", Some(quad(0.0))).unwrap();
        let b = model.add_node(root, "b", Some(quad(2.0))).unwrap();
        (model, a, b)
    }

    #[test]
    fn test_ids_are_dense_and_stable() {
        let (mut model, a, b) = two_part_model();
        assert_eq!(a, NodeId(1));
        assert_eq!(b, NodeId(2));
        let c = model.add_node(a, "c", None).unwrap();
        assert_eq!(c, NodeId(3));
        assert_eq!(model.node(c).unwrap().parent(), Some(a));
        assert_eq!(model.node(a).unwrap().children(), &[c]);
        assert_eq!(model.len(), 4);
    }

    #[test]
    fn test_add_node_rejects_unknown_parent() {
        let mut model = Model::new("m");
        assert!(model.add_node(NodeId(7), "x", None).is_err());
    }

    #[test]
    fn test_add_node_rejects_face_past_vertices() {
        let (mut model, _, _) = two_part_model();
        let before = (model.len(), model.bounding_box());
        let mut bad = quad(5.0);
        bad.add_face([0, 3, 4]);

        let root = model.root();
        assert!(matches!(model.add_node(root, "bad", Some(bad)), Err(Error::InvalidData(_))));
        assert_eq!((model.len(), model.bounding_box()), before);
        assert_eq!(model.face_count(), 4);
    }

    #[test]
    fn test_traverse_is_depth_first_preorder() {
        let (mut model, a, b) = two_part_model();
        let c = model.add_node(a, "c", None).unwrap();
        let order: Vec<NodeId> = model.traverse().map(SceneNode::id).collect();
        assert_eq!(order, vec![model.root(), a, c, b]);
    }

    #[test]
    fn test_bounding_box_follows_root_translation() {
        let (mut model, _, _) = two_part_model();
        let aabb = model.bounding_box();
        assert_eq!(aabb.min, Point3f::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Point3f::new(1.0, 1.0, 2.0));

        model.translate(&Vector3f::new(-0.5, -0.5, -1.0));
        let aabb = model.bounding_box();
        assert_relative_eq!(aabb.center(), Point3f::origin());
        assert_relative_eq!(model.position(), Vector3f::new(-0.5, -0.5, -1.0));
    }

    #[test]
    fn test_hidden_nodes_still_count_for_bounds() {
        let (mut model, _, b) = two_part_model();
        model.set_visible(b, false);
        assert_eq!(model.bounding_box().max.z, 2.0);
    }

    #[test]
    fn test_world_transform_composes_parents() {
        let (mut model, a, _) = two_part_model();
        let c = model.add_node(a, "c", Some(quad(0.0))).unwrap();
        model.node_mut(a).unwrap().transform = Transform3D::translation(Vector3f::new(1.0, 0.0, 0.0));
        model.node_mut(c).unwrap().transform = Transform3D::translation(Vector3f::new(0.0, 1.0, 0.0));
        model.translate(&Vector3f::new(0.0, 0.0, 1.0));

        let world = model.world_transforms()[c.0 as usize];
        assert_relative_eq!(world.translation_part(), Vector3f::new(1.0, 1.0, 1.0));
        assert_relative_eq!(world.transform_point(&Point3f::origin()), Point3f::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_rendered_requires_visible_ancestors() {
        let (mut model, a, b) = two_part_model();
        let c = model.add_node(a, "c", None).unwrap();
        model.set_visible(a, false);
        assert!(model.is_visible(c));
        assert!(!model.is_rendered(c));
        assert!(model.is_rendered(b));
        assert!(!model.is_rendered(NodeId(42)));

        model.show_all();
        assert!(model.is_rendered(c));
    }

    #[test]
    fn test_geometry_counts() {
        let (model, _, _) = two_part_model();
        assert!(model.has_geometry());
        assert_eq!(model.vertex_count(), 8);
        assert_eq!(model.face_count(), 4);
        assert_eq!(model.mesh_nodes().len(), 2);
        assert!(!Model::new("empty").has_geometry());
    }
}
