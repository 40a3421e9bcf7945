//! Component trait and shared component handles
//!
//! Components are stored behind [`ComponentHandle`]s so that an entity, the
//! registry and sibling components can all reach the same instance. Optional
//! behaviour is declared up front through [`Capabilities`] and cached on the
//! handle, so entities never probe a component to find out what it can do.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use super::authority::SpatialAuthority;
use super::entity::{Entity, EntityCore};
use super::schema::Options;
use crate::input::InputEvent;
use crate::physics::RigidBodyHandle;
use crate::render::NodeHandle;

bitflags::bitflags! {
    /// Optional behaviour a component type opts into
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Receives [`Component::update`] every frame
        const UPDATE = 1 << 0;
        /// Observes siblings through the lifecycle hooks
        const LIFECYCLE = 1 << 1;
        /// Accepts live option edits through [`Component::apply_options`]
        const APPLY_OPTIONS = 1 << 2;
        /// Exposes a node for the scene's render graph
        const RENDER_NODE = 1 << 3;
        /// Exposes a body for the scene's physics world
        const RIGID_BODY = 1 << 4;
        /// Can take over the entity's spatial state from its transform
        const SPATIAL_AUTHORITY = 1 << 5;
        /// Receives [`Component::handle_input`]
        const INPUT = 1 << 6;
        /// Writes the entity's pose during update; runs before other updates
        const DRIVES_POSE = 1 << 7;
    }
}

/// A sibling was added to or removed from the entity
#[derive(Debug, Clone, Copy)]
pub struct ComponentEvent<'a> {
    /// Type name of the component that changed
    pub type_name: &'a str,
    /// The component that changed
    ///
    /// Do not borrow it when `is_self` is set; the receiver is already
    /// mutably borrowed.
    pub component: &'a ComponentHandle,
    /// Whether the receiving component is the one that changed
    pub is_self: bool,
}

/// Polymorphic unit of entity state and behaviour
///
/// Every hook has a no-op default; a component only overrides what its
/// [`Capabilities`] declare.
pub trait Component: Any {
    /// Optional behaviour this component implements
    fn capabilities(&self) -> Capabilities;

    /// Advance one frame
    fn update(&mut self, _dt: f32, _entity: &Entity) {}

    /// A component was added to the owning entity
    fn on_component_added(&mut self, _entity: &Entity, _event: &ComponentEvent<'_>) {}

    /// A component was removed from the owning entity
    fn on_component_removed(&mut self, _entity: &Entity, _event: &ComponentEvent<'_>) {}

    /// Push fully defaulted, translated options into the live component
    fn apply_options(&mut self, _options: &Options) {}

    /// Node to attach to the render graph
    fn render_node(&self) -> Option<NodeHandle> {
        None
    }

    /// Body to attach to the physics world
    fn rigid_body(&self) -> Option<RigidBodyHandle> {
        None
    }

    /// Object that may become authoritative for the entity's pose
    fn spatial_authority(&self) -> Option<Rc<dyn SpatialAuthority>> {
        None
    }

    /// React to an input event
    fn handle_input(&mut self, _event: &InputEvent) {}

    /// Current state as options, used for serialisation
    fn to_options(&self) -> Options {
        Options::new()
    }

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct ComponentSlot {
    type_name: String,
    capabilities: Capabilities,
    owner: RefCell<Weak<EntityCore>>,
    component: RefCell<Box<dyn Component>>,
}

/// Shared handle to a component tagged with its registered type name
///
/// Cloning the handle does not clone the component. Equality is identity.
#[derive(Clone)]
pub struct ComponentHandle {
    slot: Rc<ComponentSlot>,
}

impl ComponentHandle {
    /// Wrap a concrete component
    pub fn new<C: Component>(type_name: impl Into<String>, component: C) -> Self {
        Self::from_boxed(type_name, Box::new(component))
    }

    /// Wrap a boxed component, as produced by registry factories
    pub fn from_boxed(type_name: impl Into<String>, component: Box<dyn Component>) -> Self {
        let capabilities = component.capabilities();
        Self {
            slot: Rc::new(ComponentSlot {
                type_name: type_name.into(),
                capabilities,
                owner: RefCell::new(Weak::new()),
                component: RefCell::new(component),
            }),
        }
    }

    /// Registered type name
    pub fn type_name(&self) -> &str {
        &self.slot.type_name
    }

    /// Capabilities declared at construction
    pub fn capabilities(&self) -> Capabilities {
        self.slot.capabilities
    }

    /// Whether all of `capability` was declared
    pub fn has_capability(&self, capability: Capabilities) -> bool {
        self.slot.capabilities.contains(capability)
    }

    /// Borrow the component immutably
    ///
    /// # Panics
    /// If the component is currently borrowed mutably.
    pub fn borrow(&self) -> Ref<'_, Box<dyn Component>> {
        self.slot.component.borrow()
    }

    /// Borrow the component mutably
    ///
    /// # Panics
    /// If the component is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, Box<dyn Component>> {
        self.slot.component.borrow_mut()
    }

    /// Borrow as the concrete type `C`, if it is one
    pub fn downcast_ref<C: Component>(&self) -> Option<Ref<'_, C>> {
        Ref::filter_map(self.slot.component.borrow(), |component| component.as_any().downcast_ref::<C>()).ok()
    }

    /// Mutably borrow as the concrete type `C`, if it is one
    pub fn downcast_mut<C: Component>(&self) -> Option<RefMut<'_, C>> {
        RefMut::filter_map(self.slot.component.borrow_mut(), |component| component.as_any_mut().downcast_mut::<C>())
            .ok()
    }

    /// Whether this is a `C`
    pub fn is<C: Component>(&self) -> bool {
        self.slot.component.borrow().as_any().is::<C>()
    }

    /// Whether an entity currently owns this component
    pub fn is_attached(&self) -> bool {
        self.slot.owner.borrow().upgrade().is_some()
    }

    /// Whether `entity` owns this component
    pub fn is_owned_by(&self, entity: &Entity) -> bool {
        self.slot
            .owner
            .borrow()
            .upgrade()
            .is_some_and(|core| Rc::ptr_eq(&core, entity.core()))
    }

    /// Id of the owning entity, once it has one
    pub fn owner_id(&self) -> Option<String> {
        self.slot.owner.borrow().upgrade().and_then(|core| core.id())
    }

    /// Whether both handles refer to the same component
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }

    pub(crate) fn attach(&self, core: &Rc<EntityCore>) {
        *self.slot.owner.borrow_mut() = Rc::downgrade(core);
    }

    pub(crate) fn detach(&self) {
        *self.slot.owner.borrow_mut() = Weak::new();
    }
}

impl PartialEq for ComponentHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ComponentHandle {}

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("type_name", &self.slot.type_name)
            .field("capabilities", &self.slot.capabilities)
            .field("owner", &self.owner_id())
            .finish_non_exhaustive()
    }
}
