//! Light component
//!
//! One component type covers every light kind. Changing the `type` option
//! swaps the payload of the existing light node, so the scene keeps the same
//! node attached and only has to mark materials dirty.
//!
//! A spot or directional light can point at another entity. The `target`
//! option names that entity; it is looked up on the first update in a scene,
//! after the rest of the scene has been loaded.

use std::any::Any;

use crate::ecs::component::{Capabilities, Component};
use crate::ecs::components::TransformComponent;
use crate::ecs::entity::Entity;
use crate::ecs::registry::{FactoryContext, RegisteredComponent};
use crate::ecs::schema::{Options, PropertySchema, PropertyValue};
use crate::foundation::math::{colour, constants};
use crate::render::{LightKind, LightNode, Node3D, NodeHandle, NodeKind, ShadowSettings};

fn light_kind(name: &str) -> Option<LightKind> {
    match name {
        "point" => Some(LightKind::Point),
        "spotlight" => Some(LightKind::Spot),
        "directional" => Some(LightKind::Directional),
        "ambient" => Some(LightKind::Ambient),
        _ => None,
    }
}

const fn light_name(kind: LightKind) -> &'static str {
    match kind {
        LightKind::Point => "point",
        LightKind::Spot => "spotlight",
        LightKind::Directional => "directional",
        LightKind::Ambient => "ambient",
    }
}

/// Light source following the entity's transform
pub struct LightComponent {
    node: NodeHandle,
    target_id: String,
    target_pending: bool,
}

impl LightComponent {
    /// Default light of `kind`
    pub fn new(kind: LightKind) -> Self {
        Self {
            node: NodeHandle::new(Node3D::new(NodeKind::Light(LightNode::new(kind)))),
            target_id: String::new(),
            target_pending: false,
        }
    }

    /// Light node
    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// Current light kind
    pub fn kind(&self) -> LightKind {
        self.node.borrow().as_light().map_or(LightKind::Point, |light| light.kind)
    }

    /// Swap the light kind, keeping the node and its settings
    ///
    /// Returns whether the kind changed.
    pub fn set_kind(&self, kind: LightKind) -> bool {
        let mut node = self.node.borrow_mut();
        match node.as_light_mut() {
            Some(light) if light.kind != kind => {
                light.kind = kind;
                if !kind.supports_shadows() {
                    light.shadow = ShadowSettings::default();
                }
                true
            }
            _ => false,
        }
    }

    /// Id of the entity this light points at
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Point the light at the entity `entity_id`, resolved on the next update
    pub fn set_target(&mut self, entity_id: &str) {
        self.target_id = entity_id.to_string();
        self.target_pending = !entity_id.is_empty();
        if let Some(light) = self.node.borrow_mut().as_light_mut() {
            light.target = None;
        }
    }

    /// Target node, if resolved and still alive
    pub fn target(&self) -> Option<NodeHandle> {
        self.node.borrow().as_light().and_then(LightNode::target)
    }

    fn resolve_target(&mut self, entity: &Entity) {
        if !self.target_pending || !entity.is_in_scene() {
            return;
        }
        self.target_pending = false;
        match entity.scene_transform_node(&self.target_id) {
            Some(target) => {
                if let Some(light) = self.node.borrow_mut().as_light_mut() {
                    light.target = Some(target.downgrade());
                }
            }
            None => log::warn!("Light target '{}' has no transform in this scene", self.target_id),
        }
    }

    fn light_value<T>(&self, default: T, f: impl FnOnce(&LightNode) -> T) -> T {
        self.node.borrow().as_light().map_or(default, f)
    }
}

impl Component for LightComponent {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::APPLY_OPTIONS | Capabilities::RENDER_NODE
    }

    fn update(&mut self, _dt: f32, entity: &Entity) {
        self.resolve_target(entity);
        if let Some(pose) = TransformComponent::pose_of(entity) {
            let mut node = self.node.borrow_mut();
            node.position = pose.position;
            node.quaternion = pose.rotation;
        }
    }

    fn apply_options(&mut self, options: &Options) {
        if let Some(kind) = options.text("type").and_then(light_kind) {
            self.set_kind(kind);
        }
        let target = options.text("target").unwrap_or_default().to_string();
        self.set_target(&target);

        let mut node = self.node.borrow_mut();
        let cast_shadow = options.bool("castShadow").unwrap_or(false);
        let Some(light) = node.as_light_mut() else {
            return;
        };
        light.colour = options.colour("colour").unwrap_or(colour::WHITE);
        light.intensity = options.f32("intensity").unwrap_or(1.0);
        light.distance = options.f32("distance").unwrap_or(0.0);
        light.angle = options.f32("angle").unwrap_or(constants::THIRD_PI);
        light.exponent = options.f32("exponent").unwrap_or(10.0);

        if !light.kind.supports_shadows() {
            node.cast_shadow = false;
            return;
        }
        let defaults = ShadowSettings::default();
        light.shadow = ShadowSettings {
            darkness: if cast_shadow { options.f32("shadowDarkness").unwrap_or(defaults.darkness) } else { 0.0 },
            camera_near: options.f32("shadowCameraNear").unwrap_or(defaults.camera_near),
            camera_far: options.f32("shadowCameraFar").unwrap_or(defaults.camera_far),
            camera_fov: options.f32("shadowCameraFov").unwrap_or(defaults.camera_fov),
            camera_visible: options.bool("shadowCameraVisible").unwrap_or(defaults.camera_visible),
        };
        node.cast_shadow = cast_shadow;
    }

    fn render_node(&self) -> Option<NodeHandle> {
        Some(self.node.clone())
    }

    fn to_options(&self) -> Options {
        let cast_shadow = self.node.borrow().cast_shadow;
        self.light_value(Options::new(), |light| {
            Options::new()
                .with("type", light_name(light.kind))
                .with("target", self.target_id.as_str())
                .with("colour", PropertyValue::Colour(light.colour))
                .with("intensity", light.intensity)
                .with("distance", light.distance)
                .with("angle", light.angle)
                .with("exponent", light.exponent)
                .with("castShadow", cast_shadow)
                .with("shadowDarkness", light.shadow.darkness)
                .with("shadowCameraNear", light.shadow.camera_near)
                .with("shadowCameraFar", light.shadow.camera_far)
                .with("shadowCameraFov", light.shadow.camera_fov)
                .with("shadowCameraVisible", light.shadow.camera_visible)
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl RegisteredComponent for LightComponent {
    const TYPE_NAME: &'static str = "light";

    fn schema() -> PropertySchema {
        let shadow = ShadowSettings::default();
        PropertySchema::new()
            .choice("type", &["point", "spotlight", "directional", "ambient"], "point")
            .text("target", "")
            .colour("colour", colour::WHITE)
            .number("intensity", 1.0)
            .number("distance", 0.0)
            .number("angle", f64::from(constants::THIRD_PI))
            .number("exponent", 10.0)
            .boolean("castShadow", false)
            .scalar("shadowDarkness", f64::from(shadow.darkness))
            .number("shadowCameraNear", f64::from(shadow.camera_near))
            .number("shadowCameraFar", f64::from(shadow.camera_far))
            .number("shadowCameraFov", f64::from(shadow.camera_fov))
            .boolean("shadowCameraVisible", shadow.camera_visible)
    }

    fn from_options(options: &Options, _context: &FactoryContext) -> Self {
        let mut light = Self::new(LightKind::Point);
        light.apply_options(options);
        light
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_light_ignores_shadow_settings() {
        let options = Options::new()
            .with("type", "point")
            .with("castShadow", true)
            .with("shadowDarkness", 0.9);
        let light = LightComponent::from_options(&options, &FactoryContext::default());

        let node = light.node().borrow();
        assert!(!node.cast_shadow);
        assert_relative_eq!(node.as_light().unwrap().shadow.darkness, 0.5);
    }

    #[test]
    fn test_changing_type_keeps_node() {
        let mut light = LightComponent::from_options(&Options::new().with("intensity", 2.0), &FactoryContext::default());
        let node = light.node().clone();

        light.apply_options(&Options::new().with("type", "spotlight").with("castShadow", true).with("shadowDarkness", 0.8));

        assert!(light.node().ptr_eq(&node));
        assert_eq!(light.kind(), LightKind::Spot);
        assert!(node.borrow().cast_shadow);
        assert_relative_eq!(node.borrow().as_light().unwrap().shadow.darkness, 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_shadowless_spot_light_has_no_darkness() {
        let options = Options::new()
            .with("type", "spotlight")
            .with("castShadow", false)
            .with("shadowDarkness", 0.9);
        let light = LightComponent::from_options(&options, &FactoryContext::default());

        let node = light.node().borrow();
        assert!(!node.cast_shadow);
        assert_relative_eq!(node.as_light().unwrap().shadow.darkness, 0.0);
    }

    #[test]
    fn test_target_waits_for_scene() {
        let mut light = LightComponent::new(LightKind::Directional);
        light.set_target("sun");
        light.update(0.0, &Entity::new());
        assert_eq!(light.target_id(), "sun");
        assert!(light.target().is_none());
    }
}
