//! Scenes
//!
//! A scene owns its entities together with the two foreign engines they live
//! in: a render graph and a physics world. Both are held by a [`SceneBridge`]
//! shared weakly with every member entity, so components added or removed
//! later are attached and detached without the scene being involved.
//!
//! ```text
//! Entity::add / Entity::remove
//!      ↓
//! SceneBridge (render graph + physics world)
//! ```

mod bridge;
mod data;

pub use bridge::SceneBridge;
pub use data::{SceneConfig, SceneData, DEFAULT_CAMERA_ENTITY_ID};

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;

use crate::ecs::components::CameraComponent;
use crate::ecs::entity::{Entity, EntityError};
use crate::ecs::registry::{ComponentRegistry, RegisteredComponent, RegistryError};
use crate::foundation::math::Vec3;
use crate::input::InputEvent;
use crate::physics::{PhysicsWorld, MAX_SUB_STEPS};
use crate::render::{NodeHandle, RenderSettings, Renderer};

/// Scene errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Entity ids must be unique within a scene
    #[error("scene already has an entity '{0}'")]
    DuplicateEntity(String),

    /// No entity with this id
    #[error("scene has no entity '{0}'")]
    EntityNotFound(String),

    /// Entity ids must not be empty
    #[error("entity id must not be empty")]
    EmptyEntityId,

    /// Entity-level failure
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Registry-level failure
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Lifecycle state of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneState {
    /// Loaded but not driven by the game
    #[default]
    Inactive,
    /// The game's current scene
    Active,
}

/// Entities plus the render graph and physics world they populate
pub struct Scene {
    entities: BTreeMap<String, Entity>,
    bridge: Rc<RefCell<SceneBridge>>,
    default_camera: Option<String>,
    active_camera: Option<String>,
    state: SceneState,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(&SceneConfig::default())
    }
}

impl Scene {
    /// Empty scene configured by `config`
    pub fn new(config: &SceneConfig) -> Self {
        let physics = PhysicsWorld::new(Vec3::new(0.0, 0.0, config.gravity));
        Self {
            entities: BTreeMap::new(),
            bridge: Rc::new(RefCell::new(SceneBridge::new(physics))),
            default_camera: config.default_camera_entity_id.clone(),
            active_camera: None,
            state: SceneState::Inactive,
        }
    }

    /// Add `entity` under `entity_id` and attach everything its components expose
    pub fn add(&mut self, entity_id: &str, mut entity: Entity) -> Result<(), SceneError> {
        if entity_id.is_empty() {
            return Err(SceneError::EmptyEntityId);
        }
        if self.entities.contains_key(entity_id) {
            return Err(SceneError::DuplicateEntity(entity_id.to_string()));
        }

        entity.join_scene(entity_id, Rc::downgrade(&self.bridge));
        {
            let mut bridge = self.bridge.borrow_mut();
            for (_, component) in entity.components() {
                bridge.on_component_added(entity_id, component);
            }
        }
        log::debug!("Entity '{}' joined scene with {} components", entity_id, entity.len());
        self.entities.insert(entity_id.to_string(), entity);
        Ok(())
    }

    /// Remove the entity `entity_id`, detaching everything its components expose
    pub fn remove(&mut self, entity_id: &str) -> Result<Entity, SceneError> {
        let mut entity = self
            .entities
            .remove(entity_id)
            .ok_or_else(|| SceneError::EntityNotFound(entity_id.to_string()))?;
        self.detach(entity_id, &mut entity);
        Ok(entity)
    }

    /// Remove every entity
    pub fn clear(&mut self) {
        for (id, mut entity) in std::mem::take(&mut self.entities) {
            self.detach(&id, &mut entity);
        }
    }

    fn detach(&mut self, entity_id: &str, entity: &mut Entity) {
        {
            let mut bridge = self.bridge.borrow_mut();
            for (_, component) in entity.components() {
                bridge.on_component_removed(entity_id, component);
            }
        }
        entity.leave_scene();
        if self.active_camera.as_deref() == Some(entity_id) {
            self.active_camera = None;
        }
        log::debug!("Entity '{}' left scene", entity_id);
    }

    /// Entity `entity_id`
    pub fn entity(&self, entity_id: &str) -> Option<&Entity> {
        self.entities.get(entity_id)
    }

    /// Mutable entity `entity_id`
    pub fn entity_mut(&mut self, entity_id: &str) -> Option<&mut Entity> {
        self.entities.get_mut(entity_id)
    }

    /// Entities by id
    pub fn entities(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.entities.iter().map(|(id, entity)| (id.as_str(), entity))
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene has no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Render graph and physics world
    pub fn bridge(&self) -> &Rc<RefCell<SceneBridge>> {
        &self.bridge
    }

    /// Step physics by `dt`, then update every entity in id order
    pub fn update(&mut self, dt: f32) {
        let steps = self.bridge.borrow_mut().physics_mut().step_simulation(dt, MAX_SUB_STEPS);
        log::trace!("Scene stepped physics {} times for dt {}", steps, dt);
        for entity in self.entities.values() {
            entity.update(dt);
        }
    }

    /// Forward `event` to every input-handling component
    pub fn handle_input(&self, event: &InputEvent) {
        for entity in self.entities.values() {
            entity.handle_input(event);
        }
    }

    /// Make this the running scene and pick its camera
    ///
    /// The configured default camera entity wins if it has a camera, otherwise
    /// the first entity with a camera in id order.
    pub fn activate(&mut self) -> Option<&str> {
        self.state = SceneState::Active;
        let preferred = self
            .default_camera
            .as_ref()
            .filter(|id| self.entities.get(*id).is_some_and(|e| e.has(CameraComponent::TYPE_NAME)))
            .cloned();
        self.active_camera = preferred.or_else(|| {
            self.entities
                .iter()
                .find(|(_, entity)| entity.has(CameraComponent::TYPE_NAME))
                .map(|(id, _)| id.clone())
        });
        match &self.active_camera {
            Some(id) => log::info!("Scene activated with camera '{}'", id),
            None => log::info!("Scene activated without a camera"),
        }
        self.active_camera.as_deref()
    }

    /// Stop being the running scene
    pub fn deactivate(&mut self) {
        self.state = SceneState::Inactive;
    }

    /// Current lifecycle state
    pub fn state(&self) -> SceneState {
        self.state
    }

    /// Whether the game is running this scene
    pub fn is_active(&self) -> bool {
        self.state == SceneState::Active
    }

    /// Entity preferred as camera on activation
    pub fn default_camera_entity_id(&self) -> Option<&str> {
        self.default_camera.as_deref()
    }

    /// Set the entity preferred as camera on activation
    pub fn set_default_camera_entity_id(&mut self, entity_id: Option<String>) {
        self.default_camera = entity_id;
    }

    /// Entity whose camera is in use
    pub fn active_camera_id(&self) -> Option<&str> {
        self.active_camera.as_deref()
    }

    /// Camera node in use
    pub fn active_camera_node(&self) -> Option<NodeHandle> {
        let entity = self.entities.get(self.active_camera.as_deref()?)?;
        let camera = entity.component::<CameraComponent>()?;
        Some(camera.node().clone())
    }

    /// Push a new aspect ratio to the camera in use
    pub fn set_aspect_ratio(&self, aspect: f32) -> bool {
        let Some(entity) = self.active_camera.as_deref().and_then(|id| self.entities.get(id)) else {
            return false;
        };
        match entity.component::<CameraComponent>() {
            Some(camera) => {
                camera.set_aspect_ratio(aspect);
                true
            }
            None => false,
        }
    }

    /// World gravity
    pub fn gravity(&self) -> Vec3 {
        self.bridge.borrow().physics().gravity()
    }

    /// Set world gravity
    pub fn set_gravity(&self, gravity: Vec3) {
        self.bridge.borrow_mut().physics_mut().set_gravity(gravity);
    }

    /// Edit one component's options live and refresh the entity
    ///
    /// Returns whether the component accepted the options.
    pub fn update_property(
        &self,
        registry: &ComponentRegistry,
        entity_id: &str,
        type_name: &str,
        raw: &Value,
    ) -> Result<bool, SceneError> {
        let entity = self
            .entities
            .get(entity_id)
            .ok_or_else(|| SceneError::EntityNotFound(entity_id.to_string()))?;
        let component = entity
            .get(type_name)
            .ok_or_else(|| EntityError::ComponentNotFound(type_name.to_string()))?;

        let applied = registry.apply_options(type_name, component, raw)?;
        let node = component.borrow().render_node();
        if node.is_some_and(|node| node.borrow().is_light()) {
            self.bridge.borrow_mut().mark_materials_dirty();
        }
        entity.update(0.0);
        Ok(applied)
    }

    /// Draw the scene from its active camera
    ///
    /// Returns `false` when there is no camera to draw from.
    pub fn render(&self, renderer: &mut dyn Renderer, settings: &RenderSettings) -> bool {
        let Some(camera) = self.active_camera_node() else {
            return false;
        };
        let bridge = self.bridge.borrow();
        renderer.render(bridge.graph(), &camera, settings);
        true
    }

    /// Serialise the scene through `registry`
    pub fn to_json(&self, registry: &ComponentRegistry) -> Result<SceneData, RegistryError> {
        let entities = self
            .entities
            .iter()
            .map(|(id, entity)| Ok((id.clone(), entity.to_json(registry)?)))
            .collect::<Result<_, RegistryError>>()?;
        Ok(SceneData {
            config: SceneConfig {
                default_camera_entity_id: self.default_camera.clone(),
                gravity: self.gravity().z,
            },
            entities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::authority::DelegationMode;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn registry() -> ComponentRegistry {
        ComponentRegistry::with_builtin_components(DelegationMode::Enabled).unwrap()
    }

    fn entity_with(registry: &ComponentRegistry, types: &[&str]) -> Entity {
        let mut entity = Entity::new();
        for type_name in types {
            entity.add(registry.create(type_name, &json!({})).unwrap()).unwrap();
        }
        entity
    }

    #[test]
    fn test_add_attaches_existing_components() {
        let registry = registry();
        let mut scene = Scene::default();
        scene.add("box", entity_with(&registry, &["transform", "mesh", "physics"])).unwrap();

        let bridge = scene.bridge().borrow();
        assert_eq!(bridge.graph().node_count(), 2);
        assert_eq!(bridge.physics().body_count(), 1);
        assert_eq!(scene.entity("box").unwrap().id().as_deref(), Some("box"));
    }

    #[test]
    fn test_duplicate_entity_id_is_rejected() {
        let mut scene = Scene::default();
        scene.add("a", Entity::new()).unwrap();
        assert_eq!(scene.add("a", Entity::new()), Err(SceneError::DuplicateEntity("a".to_string())));
        assert_eq!(scene.add("", Entity::new()), Err(SceneError::EmptyEntityId));
    }

    #[test]
    fn test_remove_detaches_and_returns_entity() {
        let registry = registry();
        let mut scene = Scene::default();
        scene.add("box", entity_with(&registry, &["transform", "mesh", "physics"])).unwrap();

        let entity = scene.remove("box").unwrap();
        assert!(!entity.is_in_scene());
        assert_eq!(entity.len(), 3);
        let bridge = scene.bridge().borrow();
        assert_eq!(bridge.graph().node_count(), 0);
        assert_eq!(bridge.physics().body_count(), 0);
    }

    #[test]
    fn test_clear_detaches_every_entity() {
        let registry = registry();
        let mut scene = Scene::default();
        scene.add("camera", entity_with(&registry, &["transform", "camera"])).unwrap();
        scene.add("box", entity_with(&registry, &["transform", "mesh", "physics"])).unwrap();
        assert_eq!(scene.activate(), Some("camera"));

        scene.clear();

        assert!(scene.is_empty());
        assert_eq!(scene.active_camera_id(), None);
        let bridge = scene.bridge().borrow();
        assert_eq!(bridge.graph().node_count(), 0);
        assert_eq!(bridge.physics().body_count(), 0);
        assert!(bridge.transform_node("box").is_none());
    }

    #[test]
    fn test_activate_falls_back_to_first_camera_id() {
        let registry = registry();
        let config = SceneConfig { default_camera_entity_id: Some("missing".to_string()), ..SceneConfig::default() };
        let mut scene = Scene::new(&config);
        scene.add("zeta", entity_with(&registry, &["transform", "camera"])).unwrap();
        scene.add("alpha", entity_with(&registry, &["transform", "camera"])).unwrap();
        scene.add("beta", entity_with(&registry, &["transform"])).unwrap();

        assert_eq!(scene.activate(), Some("alpha"));
        assert!(scene.is_active());

        scene.set_default_camera_entity_id(Some("zeta".to_string()));
        assert_eq!(scene.activate(), Some("zeta"));
    }

    #[test]
    fn test_gravity_passthrough() {
        let scene = Scene::new(&SceneConfig { default_camera_entity_id: None, gravity: -3.0 });
        assert_relative_eq!(scene.gravity(), Vec3::new(0.0, 0.0, -3.0));
        scene.set_gravity(Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(scene.to_json(&ComponentRegistry::default()).unwrap().config.gravity, -1.0);
    }
}
