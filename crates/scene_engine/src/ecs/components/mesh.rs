//! Mesh component
//!
//! A unit-sized primitive drawn with a simple material. The transform's scale
//! sizes it.

use std::any::Any;

use crate::ecs::component::{Capabilities, Component};
use crate::ecs::components::TransformComponent;
use crate::ecs::entity::Entity;
use crate::ecs::registry::{FactoryContext, RegisteredComponent};
use crate::ecs::schema::{Options, PropertySchema, PropertyValue};
use crate::foundation::math::colour;
use crate::physics::ShapeKind;
use crate::render::{Geometry, Material, MaterialKind, MeshNode, Node3D, NodeHandle, NodeKind};

fn geometry_for(shape: ShapeKind) -> Geometry {
    match shape {
        ShapeKind::Box => Geometry::unit_box(),
        ShapeKind::Sphere => Geometry::unit_sphere(),
        ShapeKind::Cylinder => Geometry::unit_cylinder(),
    }
}

fn material_kind(name: &str) -> Option<MaterialKind> {
    match name {
        "phong" => Some(MaterialKind::Phong),
        "lambert" => Some(MaterialKind::Lambert),
        "basic" => Some(MaterialKind::Basic),
        _ => None,
    }
}

const fn material_name(kind: MaterialKind) -> &'static str {
    match kind {
        MaterialKind::Phong => "phong",
        MaterialKind::Lambert => "lambert",
        MaterialKind::Basic => "basic",
    }
}

/// Drawable primitive
pub struct MeshComponent {
    node: NodeHandle,
    shape: ShapeKind,
}

impl MeshComponent {
    /// White phong mesh of `shape`
    pub fn new(shape: ShapeKind) -> Self {
        let mesh = MeshNode {
            geometry: geometry_for(shape),
            material: Material::new(MaterialKind::Phong, colour::WHITE),
        };
        Self { node: NodeHandle::new(Node3D::new(NodeKind::Mesh(mesh))), shape }
    }

    /// Primitive shape
    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    /// Replace the geometry
    pub fn set_shape(&mut self, shape: ShapeKind) {
        self.shape = shape;
        if let Some(mesh) = self.node.borrow_mut().as_mesh_mut() {
            mesh.geometry = geometry_for(shape);
        }
    }

    /// Shading model
    pub fn material_kind(&self) -> MaterialKind {
        self.node.borrow().as_mesh().map_or(MaterialKind::Phong, |mesh| mesh.material.kind)
    }

    /// Replace the material, keeping its colour
    pub fn set_material_kind(&self, kind: MaterialKind) {
        if let Some(mesh) = self.node.borrow_mut().as_mesh_mut() {
            mesh.material = Material::new(kind, mesh.material.colour);
        }
    }

    /// Packed material colour
    pub fn material_colour(&self) -> u32 {
        self.node.borrow().as_mesh().map_or(colour::WHITE, |mesh| mesh.material.colour)
    }

    /// Set the packed material colour
    pub fn set_material_colour(&self, packed: u32) {
        if let Some(mesh) = self.node.borrow_mut().as_mesh_mut() {
            mesh.material.colour = packed;
        }
    }

    /// Mesh node
    pub fn node(&self) -> &NodeHandle {
        &self.node
    }
}

impl Component for MeshComponent {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::APPLY_OPTIONS | Capabilities::RENDER_NODE
    }

    fn update(&mut self, _dt: f32, entity: &Entity) {
        if let Some(pose) = TransformComponent::pose_of(entity) {
            let mut node = self.node.borrow_mut();
            node.position = pose.position;
            node.quaternion = pose.rotation;
            node.scale = pose.scale;
        }
    }

    fn apply_options(&mut self, options: &Options) {
        if let Some(shape) = options.text("shape").and_then(ShapeKind::from_name) {
            self.set_shape(shape);
        }
        if let Some(kind) = options.text("materialType").and_then(material_kind) {
            self.set_material_kind(kind);
        }
        if let Some(packed) = options.colour("materialColour") {
            self.set_material_colour(packed);
        }
        let mut node = self.node.borrow_mut();
        node.cast_shadow = options.bool("castShadow").unwrap_or(false);
        node.receive_shadow = options.bool("receiveShadow").unwrap_or(false);
    }

    fn render_node(&self) -> Option<NodeHandle> {
        Some(self.node.clone())
    }

    fn to_options(&self) -> Options {
        let node = self.node.borrow();
        Options::new()
            .with("shape", self.shape.as_str())
            .with("materialType", material_name(self.material_kind()))
            .with("materialColour", PropertyValue::Colour(self.material_colour()))
            .with("castShadow", node.cast_shadow)
            .with("receiveShadow", node.receive_shadow)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl RegisteredComponent for MeshComponent {
    const TYPE_NAME: &'static str = "mesh";

    fn schema() -> PropertySchema {
        PropertySchema::new()
            .choice("shape", &["box", "sphere", "cylinder"], "box")
            .boolean("castShadow", false)
            .boolean("receiveShadow", false)
            .choice("materialType", &["phong", "lambert", "basic"], "phong")
            .colour("materialColour", colour::WHITE)
    }

    fn from_options(options: &Options, _context: &FactoryContext) -> Self {
        let mut mesh = Self::new(ShapeKind::Box);
        mesh.apply_options(options);
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_shape_the_node() {
        let options = Options::new()
            .with("shape", "cylinder")
            .with("materialType", "lambert")
            .with("materialColour", PropertyValue::Colour(0x12_3456))
            .with("castShadow", true);
        let mesh = MeshComponent::from_options(&options, &FactoryContext::default());

        let node = mesh.node().borrow();
        let payload = node.as_mesh().unwrap();
        assert_eq!(payload.geometry, Geometry::unit_cylinder());
        assert_eq!(payload.material.kind, MaterialKind::Lambert);
        assert_eq!(payload.material.colour, 0x12_3456);
        assert!(node.cast_shadow);
        assert!(!node.receive_shadow);
    }

    #[test]
    fn test_changing_material_keeps_colour() {
        let mesh = MeshComponent::new(ShapeKind::Sphere);
        mesh.set_material_colour(0xFF_0000);
        mesh.set_material_kind(MaterialKind::Basic);
        assert_eq!(mesh.material_colour(), 0xFF_0000);
        assert_eq!(mesh.material_kind(), MaterialKind::Basic);
    }
}
