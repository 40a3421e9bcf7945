//! Entities
//!
//! An entity is a bag of at most one component per type name. It owns its
//! components' lifetime, tells every lifecycle-observing sibling about each
//! addition and removal, and forwards the same notification to the scene it
//! belongs to once the siblings are done.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use serde_json::Value;

use super::component::{Capabilities, ComponentEvent, ComponentHandle};
use super::registry::{ComponentRegistry, RegisteredComponent, RegistryError};
use crate::input::InputEvent;
use crate::render::NodeHandle;
use crate::scene::SceneBridge;

/// Serialised entity: component type name to flat options
pub type EntityData = BTreeMap<String, Value>;

/// Identity shared between an entity and the components it owns
#[derive(Debug, Default)]
pub(crate) struct EntityCore {
    id: RefCell<Option<String>>,
}

impl EntityCore {
    pub(crate) fn id(&self) -> Option<String> {
        self.id.borrow().clone()
    }
}

/// Entity errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// A component of this type is already attached
    #[error("entity already has a '{0}' component")]
    DuplicateComponent(String),

    /// The component belongs to another entity
    #[error("'{0}' component is already attached to an entity")]
    AlreadyAttached(String),

    /// No component of this type is attached
    #[error("entity has no '{0}' component")]
    ComponentNotFound(String),
}

/// A bag of components
#[derive(Debug, Default)]
pub struct Entity {
    core: Rc<EntityCore>,
    components: BTreeMap<String, ComponentHandle>,
    observers: Vec<ComponentHandle>,
    scene: Option<Weak<RefCell<SceneBridge>>>,
}

impl Entity {
    /// Empty entity outside any scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Id assigned by the scene, once added to one
    pub fn id(&self) -> Option<String> {
        self.core.id()
    }

    pub(crate) fn core(&self) -> &Rc<EntityCore> {
        &self.core
    }

    /// Attach a component and run the lifecycle notifications
    ///
    /// Observers are notified in type-name order, then the owning scene.
    pub fn add(&mut self, component: ComponentHandle) -> Result<(), EntityError> {
        let type_name = component.type_name().to_string();
        if self.components.contains_key(&type_name) {
            return Err(EntityError::DuplicateComponent(type_name));
        }
        if component.is_attached() {
            return Err(EntityError::AlreadyAttached(type_name));
        }

        component.attach(&self.core);
        self.components.insert(type_name.clone(), component.clone());
        self.collect_observers();

        let this: &Self = self;
        for observer in &this.observers {
            let event =
                ComponentEvent { type_name: &type_name, component: &component, is_self: observer.ptr_eq(&component) };
            observer.borrow_mut().on_component_added(this, &event);
        }
        if let (Some(bridge), Some(id)) = (this.scene_bridge(), this.id()) {
            bridge.borrow_mut().on_component_added(&id, &component);
        }
        Ok(())
    }

    /// Detach the component of `type_name` and hand it back
    pub fn remove(&mut self, type_name: &str) -> Result<ComponentHandle, EntityError> {
        let component = self
            .components
            .remove(type_name)
            .ok_or_else(|| EntityError::ComponentNotFound(type_name.to_string()))?;
        component.detach();
        self.collect_observers();

        let this: &Self = self;
        let event = ComponentEvent { type_name, component: &component, is_self: false };
        for observer in &this.observers {
            observer.borrow_mut().on_component_removed(this, &event);
        }
        if let (Some(bridge), Some(id)) = (this.scene_bridge(), this.id()) {
            bridge.borrow_mut().on_component_removed(&id, &component);
        }
        Ok(component)
    }

    fn collect_observers(&mut self) {
        self.observers = self
            .components
            .values()
            .filter(|c| c.has_capability(Capabilities::LIFECYCLE))
            .cloned()
            .collect();
    }

    /// Advance every updating component
    ///
    /// Pose drivers such as controllers run first so that components mirroring
    /// the transform see this frame's pose. Within each group the order is by
    /// type name.
    pub fn update(&self, dt: f32) {
        let (drivers, followers): (Vec<_>, Vec<_>) = self
            .components
            .values()
            .filter(|c| c.has_capability(Capabilities::UPDATE))
            .partition(|c| c.has_capability(Capabilities::DRIVES_POSE));
        for component in drivers.into_iter().chain(followers) {
            component.borrow_mut().update(dt, self);
        }
    }

    /// Forward an input event to every input-handling component
    pub fn handle_input(&self, event: &InputEvent) {
        for component in self.components.values() {
            if component.has_capability(Capabilities::INPUT) {
                component.borrow_mut().handle_input(event);
            }
        }
    }

    /// Whether a component of `type_name` is attached
    pub fn has(&self, type_name: &str) -> bool {
        self.components.contains_key(type_name)
    }

    /// Component of `type_name`
    pub fn get(&self, type_name: &str) -> Option<&ComponentHandle> {
        self.components.get(type_name)
    }

    /// Borrow the built-in component `C` under its registered name
    pub fn component<C: RegisteredComponent>(&self) -> Option<Ref<'_, C>> {
        self.get(C::TYPE_NAME).and_then(ComponentHandle::downcast_ref::<C>)
    }

    /// Mutably borrow the built-in component `C` under its registered name
    pub fn component_mut<C: RegisteredComponent>(&self) -> Option<RefMut<'_, C>> {
        self.get(C::TYPE_NAME).and_then(ComponentHandle::downcast_mut::<C>)
    }

    /// Attached components by type name
    pub fn components(&self) -> impl Iterator<Item = (&str, &ComponentHandle)> {
        self.components.iter().map(|(name, handle)| (name.as_str(), handle))
    }

    /// Number of attached components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no components are attached
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Whether the entity belongs to a live scene
    pub fn is_in_scene(&self) -> bool {
        self.scene_bridge().is_some()
    }

    /// Transform node of another entity in the same scene
    pub fn scene_transform_node(&self, entity_id: &str) -> Option<NodeHandle> {
        let bridge = self.scene_bridge()?;
        let bridge = bridge.borrow();
        bridge.transform_node(entity_id)
    }

    fn scene_bridge(&self) -> Option<Rc<RefCell<SceneBridge>>> {
        self.scene.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn join_scene(&mut self, id: &str, bridge: Weak<RefCell<SceneBridge>>) {
        *self.core.id.borrow_mut() = Some(id.to_string());
        self.scene = Some(bridge);
    }

    pub(crate) fn leave_scene(&mut self) {
        self.scene = None;
    }

    /// Serialise every component through the registry
    pub fn to_json(&self, registry: &ComponentRegistry) -> Result<EntityData, RegistryError> {
        self.components
            .iter()
            .map(|(name, handle)| Ok((name.clone(), registry.serialize(handle)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{CameraComponent, TransformComponent};
    use crate::ecs::registry::FactoryContext;

    #[test]
    fn test_lookup_and_removal() {
        let mut entity = Entity::new();
        entity.add(ComponentHandle::new("camera", CameraComponent::new(75.0, 0.1, 1000.0))).unwrap();

        assert!(entity.has("camera"));
        assert!(entity.get("transform").is_none());
        assert!(entity.component::<CameraComponent>().is_some());
        assert!(matches!(
            entity.remove("transform"),
            Err(EntityError::ComponentNotFound(name)) if name == "transform"
        ));

        let camera = entity.remove("camera").unwrap();
        assert!(!camera.is_attached());
        assert!(entity.is_empty());
    }

    #[test]
    fn test_components_know_their_owner() {
        let mut entity = Entity::new();
        let transform = ComponentHandle::new("transform", TransformComponent::new(&FactoryContext::default()));
        entity.add(transform.clone()).unwrap();

        assert!(transform.is_owned_by(&entity));
        assert_eq!(transform.owner_id(), None);
        assert!(!entity.is_in_scene());
    }
}
