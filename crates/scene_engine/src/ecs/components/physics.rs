//! Physics component
//!
//! Wraps a rigid body. Once the entity also has a transform, the body becomes
//! the transform's spatial authority, so everything on the entity follows the
//! simulation.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::ecs::authority::SpatialAuthority;
use crate::ecs::component::{Capabilities, Component, ComponentEvent};
use crate::ecs::components::TransformComponent;
use crate::ecs::entity::Entity;
use crate::ecs::registry::{FactoryContext, RegisteredComponent};
use crate::ecs::schema::{Options, PropertySchema};
use crate::foundation::math::{Quat, Vec3};
use crate::physics::{RigidBody, RigidBodyHandle, ShapeKind};

const DEFAULT_MASS: f32 = 1.0;
const DEFAULT_FRICTION: f32 = 0.5;

impl SpatialAuthority for RefCell<RigidBody> {
    fn position(&self) -> Vec3 {
        self.borrow().position()
    }

    fn set_position(&self, position: Vec3) {
        self.borrow_mut().set_position(position);
    }

    fn rotation(&self) -> Quat {
        self.borrow().rotation()
    }

    fn set_rotation(&self, rotation: Quat) {
        self.borrow_mut().set_rotation(rotation);
    }

    fn scale(&self) -> Vec3 {
        self.borrow().scale()
    }

    fn set_scale(&self, scale: Vec3) {
        self.borrow_mut().set_scale(scale);
    }
}

/// Rigid body attached to an entity
pub struct PhysicsComponent {
    body: RigidBodyHandle,
    registered_as: String,
}

impl PhysicsComponent {
    /// Unit body of `shape` and `mass`
    pub fn new(shape: ShapeKind, mass: f32) -> Self {
        Self {
            body: RigidBodyHandle::new(RigidBody::new(shape, mass)),
            registered_as: Self::TYPE_NAME.to_string(),
        }
    }

    /// The wrapped body
    pub fn body(&self) -> &RigidBodyHandle {
        &self.body
    }

    fn authority(&self) -> Rc<dyn SpatialAuthority> {
        self.body.shared()
    }

    /// Wake the body
    pub fn activate(&self) {
        self.body.borrow_mut().activate();
    }

    /// Apply a force at a point relative to the centre of mass
    pub fn apply_force(&self, force: Vec3, relative_position: Vec3) {
        self.body.borrow_mut().apply_force(force, relative_position);
    }

    /// Apply a force through the centre of mass
    pub fn apply_central_force(&self, force: Vec3) {
        self.body.borrow_mut().apply_central_force(force);
    }

    /// Apply a torque
    pub fn apply_torque(&self, torque: Vec3) {
        self.body.borrow_mut().apply_torque(torque);
    }

    /// Apply an impulse at a point relative to the centre of mass
    pub fn apply_impulse(&self, impulse: Vec3, relative_position: Vec3) {
        self.body.borrow_mut().apply_impulse(impulse, relative_position);
    }

    /// Apply an impulse through the centre of mass
    pub fn apply_central_impulse(&self, impulse: Vec3) {
        self.body.borrow_mut().apply_central_impulse(impulse);
    }

    /// Apply an angular impulse
    pub fn apply_torque_impulse(&self, torque: Vec3) {
        self.body.borrow_mut().apply_torque_impulse(torque);
    }

    /// Linear velocity
    pub fn linear_velocity(&self) -> Vec3 {
        self.body.borrow().linear_velocity()
    }

    /// Set linear velocity
    pub fn set_linear_velocity(&self, velocity: Vec3) {
        self.body.borrow_mut().set_linear_velocity(velocity);
    }

    /// Angular velocity
    pub fn angular_velocity(&self) -> Vec3 {
        self.body.borrow().angular_velocity()
    }

    /// Set angular velocity
    pub fn set_angular_velocity(&self, velocity: Vec3) {
        self.body.borrow_mut().set_angular_velocity(velocity);
    }

    fn subscribe_transform(&self, entity: &Entity) {
        let Some(mut transform) = entity.component_mut::<TransformComponent>() else {
            return;
        };
        if let Err(err) = transform.subscribe_authority(&self.registered_as, &self.authority()) {
            log::debug!("Physics body not taking over transform: {}", err);
        }
    }
}

impl Component for PhysicsComponent {
    fn capabilities(&self) -> Capabilities {
        Capabilities::LIFECYCLE | Capabilities::APPLY_OPTIONS | Capabilities::RIGID_BODY | Capabilities::SPATIAL_AUTHORITY
    }

    fn on_component_added(&mut self, entity: &Entity, event: &ComponentEvent<'_>) {
        if event.is_self {
            // The transform unsubscribes by the name this component is attached under
            self.registered_as = event.type_name.to_string();
            self.subscribe_transform(entity);
        } else if event.type_name == TransformComponent::TYPE_NAME {
            self.subscribe_transform(entity);
        }
    }

    /// Mutates the existing body; the transform is not re-seeded
    fn apply_options(&mut self, options: &Options) {
        let mut body = self.body.borrow_mut();
        if let Some(shape) = options.text("shape").and_then(ShapeKind::from_name) {
            if shape != body.shape().kind() {
                body.set_shape_kind(shape);
            }
        }
        body.set_mass(options.f32("mass").unwrap_or(DEFAULT_MASS));
        body.set_friction(options.f32("friction").unwrap_or(DEFAULT_FRICTION));
        body.set_damping(options.f32("damping").unwrap_or(0.0));
        body.set_angular_damping(options.f32("angularDamping").unwrap_or(0.0));
        body.set_restitution(options.f32("restitution").unwrap_or(0.0));
    }

    fn rigid_body(&self) -> Option<RigidBodyHandle> {
        Some(self.body.clone())
    }

    fn spatial_authority(&self) -> Option<Rc<dyn SpatialAuthority>> {
        Some(self.authority())
    }

    fn to_options(&self) -> Options {
        let body = self.body.borrow();
        Options::new()
            .with("shape", body.shape().kind().as_str())
            .with("mass", body.mass())
            .with("friction", body.friction())
            .with("damping", body.damping())
            .with("angularDamping", body.angular_damping())
            .with("restitution", body.restitution())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl RegisteredComponent for PhysicsComponent {
    const TYPE_NAME: &'static str = "physics";

    fn schema() -> PropertySchema {
        PropertySchema::new()
            .choice("shape", &["box", "sphere", "cylinder"], "box")
            .number("mass", f64::from(DEFAULT_MASS))
            .scalar("friction", f64::from(DEFAULT_FRICTION))
            .scalar("damping", 0.0)
            .scalar("angularDamping", 0.0)
            .scalar("restitution", 0.0)
    }

    fn from_options(options: &Options, _context: &FactoryContext) -> Self {
        let shape = options.text("shape").and_then(ShapeKind::from_name).unwrap_or(ShapeKind::Box);
        let mut physics = Self::new(shape, DEFAULT_MASS);
        physics.apply_options(options);
        physics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_apply_options_mutates_body_in_place() {
        let mut physics = PhysicsComponent::new(ShapeKind::Box, 1.0);
        let body = physics.body().clone();
        body.borrow_mut().set_position(Vec3::new(0.0, 0.0, 7.0));

        physics.apply_options(&Options::new().with("shape", "sphere").with("mass", 4.0_f32).with("friction", 0.9_f32));

        assert!(physics.body().ptr_eq(&body));
        assert_eq!(body.borrow().shape().kind(), ShapeKind::Sphere);
        assert_relative_eq!(body.borrow().mass(), 4.0);
        assert_relative_eq!(body.borrow().friction(), 0.9);
        assert_relative_eq!(body.borrow().position(), Vec3::new(0.0, 0.0, 7.0));
    }

    #[test]
    fn test_body_is_a_spatial_authority() {
        let physics = PhysicsComponent::new(ShapeKind::Box, 1.0);
        let authority = physics.spatial_authority().unwrap();
        authority.set_scale(Vec3::new(3.0, 3.0, 3.0));
        assert_relative_eq!(physics.body().borrow().scale(), Vec3::new(3.0, 3.0, 3.0));
        assert_relative_eq!(authority.scale(), Vec3::new(3.0, 3.0, 3.0));
    }
}
