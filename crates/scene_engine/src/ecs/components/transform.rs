//! Transform component
//!
//! Gives an entity a position, rotation and scale. The pose lives in a group
//! node of the render graph until a [`SpatialAuthority`] subscribes, after
//! which the authority is the source of truth and the node only mirrors it.

use std::any::Any;
use std::rc::Rc;

use crate::ecs::authority::{DelegationError, SpatialAuthority, TransformAuthority};
use crate::ecs::component::{Capabilities, Component, ComponentEvent, ComponentHandle};
use crate::ecs::entity::Entity;
use crate::ecs::registry::{FactoryContext, RegisteredComponent};
use crate::ecs::schema::{Options, PropertySchema};
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::render::NodeHandle;

/// Position, rotation and scale of an entity
pub struct TransformComponent {
    authority: TransformAuthority,
}

impl TransformComponent {
    /// Identity transform
    pub fn new(context: &FactoryContext) -> Self {
        Self { authority: TransformAuthority::new(context.delegation) }
    }

    /// Authoritative position
    pub fn position(&self) -> Vec3 {
        self.authority.position()
    }

    /// Set the position
    pub fn set_position(&self, position: Vec3) {
        self.authority.set_position(position);
    }

    /// Authoritative rotation
    pub fn rotation(&self) -> Quat {
        self.authority.rotation()
    }

    /// Set the rotation
    pub fn set_rotation(&self, rotation: Quat) {
        self.authority.set_rotation(rotation);
    }

    /// Authoritative scale
    pub fn scale(&self) -> Vec3 {
        self.authority.scale()
    }

    /// Set the scale
    pub fn set_scale(&self, scale: Vec3) {
        self.authority.set_scale(scale);
    }

    /// Authoritative pose
    pub fn pose(&self) -> Transform {
        self.authority.pose()
    }

    /// The group node holding the mirrored pose
    pub fn node(&self) -> &NodeHandle {
        self.authority.node()
    }

    /// Hand spatial authority to the component behind `candidate`
    ///
    /// `candidate` must not be borrowed mutably by the caller.
    pub fn subscribe(&mut self, candidate: &ComponentHandle) -> Result<(), DelegationError> {
        let authority = candidate
            .borrow()
            .spatial_authority()
            .ok_or_else(|| DelegationError::NotAnAuthority(candidate.type_name().to_string()))?;
        self.authority.subscribe(candidate.type_name(), &authority)
    }

    /// Hand spatial authority to `authority`, registered as `source`
    pub fn subscribe_authority(&mut self, source: &str, authority: &Rc<dyn SpatialAuthority>) -> Result<(), DelegationError> {
        self.authority.subscribe(source, authority)
    }

    /// Take spatial authority back
    pub fn unsubscribe(&mut self) -> bool {
        self.authority.unsubscribe()
    }

    /// Whether a live authority owns the pose
    pub fn is_delegating(&self) -> bool {
        self.authority.is_delegating()
    }

    /// Type name of the subscribed component
    pub fn subscriber(&self) -> Option<&str> {
        self.authority.subscriber_source()
    }

    /// Pose of `entity`'s transform, if it has one
    pub fn pose_of(entity: &Entity) -> Option<Transform> {
        entity.component::<Self>().map(|transform| transform.pose())
    }
}

impl Component for TransformComponent {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::LIFECYCLE | Capabilities::APPLY_OPTIONS | Capabilities::RENDER_NODE
    }

    fn update(&mut self, _dt: f32, _entity: &Entity) {
        self.authority.sync();
    }

    fn on_component_removed(&mut self, _entity: &Entity, event: &ComponentEvent<'_>) {
        if self.authority.subscriber_source() == Some(event.type_name) {
            self.authority.unsubscribe();
            log::debug!("Transform authority '{}' removed, transform owns its pose again", event.type_name);
        }
    }

    fn apply_options(&mut self, options: &Options) {
        if let Some(scale) = options.vector("scale") {
            self.set_scale(scale);
        }
        if let Some(position) = options.vector("position") {
            self.set_position(position);
        }
        if let Some(rotation) = options.quaternion("rotation") {
            self.set_rotation(rotation);
        }
    }

    fn render_node(&self) -> Option<NodeHandle> {
        Some(self.node().clone())
    }

    fn to_options(&self) -> Options {
        Options::new()
            .with("position", self.position())
            .with("rotation", self.rotation())
            .with("scale", self.scale())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl RegisteredComponent for TransformComponent {
    const TYPE_NAME: &'static str = "transform";

    fn schema() -> PropertySchema {
        PropertySchema::new()
            .vector("position", [0.0, 0.0, 0.0])
            .vector("scale", [1.0, 1.0, 1.0])
            .quaternion("rotation", [0.0, 0.0, 0.0, 1.0])
    }

    fn from_options(options: &Options, context: &FactoryContext) -> Self {
        let mut transform = Self::new(context);
        transform.apply_options(options);
        transform
    }
}
