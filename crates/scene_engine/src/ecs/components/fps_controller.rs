//! First-person controller
//!
//! Walks a private upright cylinder body through the physics world with WASD
//! impulses and keeps the entity's transform at eye height above it. The body
//! only yaws; pitch is applied to the transform alone.

use std::any::Any;

use super::controls::{MouseLook, MoveAxes};
use crate::ecs::component::{Capabilities, Component};
use crate::ecs::components::TransformComponent;
use crate::ecs::entity::Entity;
use crate::ecs::registry::{FactoryContext, RegisteredComponent};
use crate::ecs::schema::{Options, PropertySchema};
use crate::foundation::math::{axis_angle, constants, quat_from_xyzw, Vec3};
use crate::input::InputEvent;
use crate::physics::{RigidBody, RigidBodyHandle, ShapeKind};

const SENSITIVITY: f32 = -0.0035;
const SPEED: f32 = 150.0;
const BODY_MASS: f32 = 100.0;
const BODY_SIZE: [f32; 3] = [2.0, 16.0, 2.0];
const EYE_OFFSET: f32 = 10.0;

/// Physics-driven walking camera control
pub struct FpsControllerComponent {
    look: MouseLook,
    axes: MoveAxes,
    body: RigidBodyHandle,
}

impl FpsControllerComponent {
    /// Controller with its body standing at (0, -50, 16)
    pub fn new() -> Self {
        let mut body = RigidBody::new(ShapeKind::Cylinder, BODY_MASS);
        body.set_angular_damping(10_000.0);
        body.set_friction(0.9);
        body.set_damping(0.0);
        body.set_scale(Vec3::from(BODY_SIZE));
        body.set_position(Vec3::new(0.0, -50.0, BODY_SIZE[1]));
        body.set_rotation(quat_from_xyzw(0.707, 0.0, 0.0, 0.707));
        Self { look: MouseLook::new(SENSITIVITY), axes: MoveAxes::default(), body: RigidBodyHandle::new(body) }
    }

    /// The walking body
    pub fn body(&self) -> &RigidBodyHandle {
        &self.body
    }
}

impl Default for FpsControllerComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for FpsControllerComponent {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::INPUT | Capabilities::RIGID_BODY | Capabilities::DRIVES_POSE
    }

    fn update(&mut self, dt: f32, entity: &Entity) {
        if dt.abs() < f32::EPSILON {
            return;
        }
        let Some(transform) = entity.component::<TransformComponent>() else {
            return;
        };
        transform.set_rotation(self.look.look());

        let mut body = self.body.borrow_mut();
        transform.set_position(body.position() + Vec3::new(0.0, 0.0, EYE_OFFSET));

        let yaw = self.look.yaw();
        body.set_rotation(yaw * axis_angle(&Vec3::x(), constants::HALF_PI));

        let forward = yaw * Vec3::y() * (SPEED * self.axes.forward);
        let right = yaw * Vec3::x() * (SPEED * self.axes.right);
        if body.linear_velocity().norm() < SPEED {
            body.apply_central_impulse(forward + right);
        }
    }

    fn handle_input(&mut self, event: &InputEvent) {
        self.look.handle(event);
        self.axes.handle(event, false);
    }

    fn rigid_body(&self) -> Option<RigidBodyHandle> {
        Some(self.body.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl RegisteredComponent for FpsControllerComponent {
    const TYPE_NAME: &'static str = "fpscontroller";

    fn schema() -> PropertySchema {
        PropertySchema::new()
    }

    fn from_options(_options: &Options, _context: &FactoryContext) -> Self {
        Self::new()
    }
}
