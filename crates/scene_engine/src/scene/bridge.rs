//! Scene bridge - keeps the foreign engines in step with component lifecycle
//!
//! Entities hold a weak reference to their scene's bridge and report every
//! component addition and removal to it. The bridge attaches exposed render
//! nodes to the render graph and exposed bodies to the physics world, and
//! remembers each entity's transform node so lights can target entities.

use std::collections::BTreeMap;

use crate::ecs::component::{Capabilities, ComponentHandle};
use crate::ecs::components::TransformComponent;
use crate::physics::{PhysicsWorld, RigidBodyHandle};
use crate::render::{NodeHandle, SceneGraph, SimpleListGraph};

/// Render graph and physics world of one scene
pub struct SceneBridge {
    graph: Box<dyn SceneGraph>,
    physics: PhysicsWorld,
    anchors: BTreeMap<String, NodeHandle>,
}

impl SceneBridge {
    /// Bridge over a list graph and a world with `physics` settings
    pub fn new(physics: PhysicsWorld) -> Self {
        Self::with_graph(Box::new(SimpleListGraph::new()), physics)
    }

    /// Bridge over a custom render graph
    pub fn with_graph(graph: Box<dyn SceneGraph>, physics: PhysicsWorld) -> Self {
        Self { graph, physics, anchors: BTreeMap::new() }
    }

    /// Render graph
    pub fn graph(&self) -> &dyn SceneGraph {
        self.graph.as_ref()
    }

    /// Mutable render graph
    pub fn graph_mut(&mut self) -> &mut dyn SceneGraph {
        self.graph.as_mut()
    }

    /// Physics world
    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Mutable physics world
    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Transform node of `entity_id`, if it has a transform
    pub fn transform_node(&self, entity_id: &str) -> Option<NodeHandle> {
        self.anchors.get(entity_id).cloned()
    }

    /// Attach whatever `component` exposes
    pub fn on_component_added(&mut self, entity_id: &str, component: &ComponentHandle) {
        if let Some(node) = exposed_node(component) {
            let is_light = node.borrow().is_light();
            if component.is::<TransformComponent>() {
                self.anchors.insert(entity_id.to_string(), node.clone());
            }
            if self.graph.add(node) {
                log::debug!("Attached '{}' node of '{}' to render graph", component.type_name(), entity_id);
            }
            if is_light {
                let dirty = self.graph.mark_materials_dirty();
                log::debug!("Light added, {} materials marked for rebuild", dirty);
            }
        }
        if let Some(body) = exposed_body(component) {
            if self.physics.add_rigid_body(body) {
                log::debug!("Attached '{}' body of '{}' to physics world", component.type_name(), entity_id);
            }
        }
    }

    /// Detach whatever `component` exposes
    pub fn on_component_removed(&mut self, entity_id: &str, component: &ComponentHandle) {
        if let Some(node) = exposed_node(component) {
            let is_light = node.borrow().is_light();
            if component.is::<TransformComponent>() {
                self.anchors.remove(entity_id);
            }
            if self.graph.remove(&node) {
                log::debug!("Detached '{}' node of '{}' from render graph", component.type_name(), entity_id);
                if is_light {
                    self.graph.mark_materials_dirty();
                }
            }
        }
        if let Some(body) = exposed_body(component) {
            if self.physics.remove_rigid_body(&body) {
                log::debug!("Detached '{}' body of '{}' from physics world", component.type_name(), entity_id);
            }
        }
    }

    /// Mark every material in the render graph for rebuild
    pub fn mark_materials_dirty(&mut self) -> usize {
        self.graph.mark_materials_dirty()
    }
}

fn exposed_node(component: &ComponentHandle) -> Option<NodeHandle> {
    if !component.has_capability(Capabilities::RENDER_NODE) {
        return None;
    }
    component.borrow().render_node()
}

fn exposed_body(component: &ComponentHandle) -> Option<RigidBodyHandle> {
    if !component.has_capability(Capabilities::RIGID_BODY) {
        return None;
    }
    component.borrow().rigid_body()
}
