//! Scene graph trait and implementations
//!
//! The render graph root every scene owns. Components never add themselves;
//! the scene attaches and detaches their nodes as components come and go.

use super::node::NodeHandle;

/// Root container of the render nodes of one scene
///
/// Allows pluggable implementations (list, octree, ...) behind one API.
pub trait SceneGraph {
    /// Attach a node. Returns `false` if the node was already attached.
    fn add(&mut self, node: NodeHandle) -> bool;

    /// Detach a node. Returns `false` if the node was not attached.
    fn remove(&mut self, node: &NodeHandle) -> bool;

    /// Whether the node is attached
    fn contains(&self, node: &NodeHandle) -> bool;

    /// All attached nodes in attachment order
    fn nodes(&self) -> &[NodeHandle];

    /// Get the total number of attached nodes
    fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// Detach everything
    fn clear(&mut self);

    /// Flag every mesh material for rebuild. Returns the number of materials flagged.
    fn mark_materials_dirty(&self) -> usize {
        let mut flagged = 0;
        for node in self.nodes() {
            if let Some(mesh) = node.borrow_mut().as_mesh_mut() {
                mesh.material.needs_update = true;
                flagged += 1;
            }
        }
        flagged
    }
}

/// Simple list-based scene graph (no spatial optimization)
///
/// Performs linear search for all queries. Sufficient for the small scenes
/// the editor produces.
#[derive(Debug, Default)]
pub struct SimpleListGraph {
    nodes: Vec<NodeHandle>,
}

impl SimpleListGraph {
    /// Create a new empty scene graph
    pub fn new() -> Self {
        Self::default()
    }
}

impl SceneGraph for SimpleListGraph {
    fn add(&mut self, node: NodeHandle) -> bool {
        if self.contains(&node) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    fn remove(&mut self, node: &NodeHandle) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| !n.ptr_eq(node));
        self.nodes.len() != before
    }

    fn contains(&self, node: &NodeHandle) -> bool {
        self.nodes.iter().any(|n| n.ptr_eq(node))
    }

    fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    fn clear(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::node::{Geometry, Material, MaterialKind, MeshNode, Node3D, NodeKind};

    fn mesh_node() -> NodeHandle {
        NodeHandle::new(Node3D::new(NodeKind::Mesh(MeshNode {
            geometry: Geometry::unit_box(),
            material: Material::new(MaterialKind::Phong, 0xFF_FFFF),
        })))
    }

    #[test]
    fn test_simple_list_graph_add_remove() {
        let mut graph = SimpleListGraph::new();
        let first = NodeHandle::new(Node3D::group());
        let second = mesh_node();

        assert!(graph.add(first.clone()));
        assert!(graph.add(second.clone()));
        assert!(!graph.add(first.clone()));
        assert_eq!(graph.node_count(), 2);

        assert!(graph.remove(&first));
        assert!(!graph.remove(&first));
        assert!(!graph.contains(&first));
        assert!(graph.contains(&second));

        graph.clear();
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_mark_materials_dirty_only_touches_meshes() {
        let mut graph = SimpleListGraph::new();
        let mesh = mesh_node();
        mesh.borrow_mut().as_mesh_mut().unwrap().material.needs_update = false;
        graph.add(mesh.clone());
        graph.add(NodeHandle::new(Node3D::group()));

        assert_eq!(graph.mark_materials_dirty(), 1);
        assert!(mesh.borrow().as_mesh().unwrap().material.needs_update);
    }
}
