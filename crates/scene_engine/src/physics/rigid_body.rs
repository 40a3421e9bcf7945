//! Rigid bodies

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use super::shape::{CollisionShape, ShapeKind};
use crate::foundation::math::{Quat, Vec3};

/// A simulated body with a collision shape and a world transform
#[derive(Debug, Clone)]
pub struct RigidBody {
    shape: CollisionShape,
    mass: f32,
    inertia: Vec3,
    friction: f32,
    restitution: f32,
    linear_damping: f32,
    angular_damping: f32,
    position: Vec3,
    rotation: Quat,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
    total_force: Vec3,
    total_torque: Vec3,
    active: bool,
}

impl RigidBody {
    /// Unit body of the given shape and mass at the origin
    pub fn new(kind: ShapeKind, mass: f32) -> Self {
        let shape = CollisionShape::new(kind);
        let inertia = shape.local_inertia(mass);
        Self {
            shape,
            mass,
            inertia,
            friction: 0.5,
            restitution: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            linear_velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            total_force: Vec3::zeros(),
            total_torque: Vec3::zeros(),
            active: true,
        }
    }

    /// Collision shape
    pub fn shape(&self) -> &CollisionShape {
        &self.shape
    }

    /// Swap the primitive kind, keeping the current scaling and mass
    pub fn set_shape_kind(&mut self, kind: ShapeKind) {
        let scaling = self.shape.local_scaling();
        self.shape = CollisionShape::new(kind);
        self.shape.set_local_scaling(scaling);
        self.update_inertia();
    }

    /// World position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Teleport the body
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.activate();
    }

    /// World rotation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Reorient the body
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.activate();
    }

    /// Local scaling of the collision shape
    pub fn scale(&self) -> Vec3 {
        self.shape.local_scaling()
    }

    /// Resize the collision shape. Inertia follows.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.shape.set_local_scaling(scale);
        self.update_inertia();
        self.activate();
    }

    /// Mass, 0 for static bodies
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Change the mass. Inertia follows.
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass.max(0.0);
        self.update_inertia();
    }

    /// Diagonal of the local inertia tensor
    pub fn inertia(&self) -> Vec3 {
        self.inertia
    }

    /// Override the local inertia
    pub fn set_inertia(&mut self, inertia: Vec3) {
        self.inertia = inertia;
    }

    /// Whether the body is moved by the simulation
    pub fn is_dynamic(&self) -> bool {
        self.mass > 0.0
    }

    /// Friction coefficient
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Set the friction coefficient
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    /// Restitution coefficient
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Set the restitution coefficient
    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution;
    }

    /// Linear damping in `[0, 1]`
    pub fn damping(&self) -> f32 {
        self.linear_damping
    }

    /// Set linear damping, clamped to `[0, 1]`
    pub fn set_damping(&mut self, damping: f32) {
        self.linear_damping = damping.clamp(0.0, 1.0);
    }

    /// Angular damping in `[0, 1]`
    pub fn angular_damping(&self) -> f32 {
        self.angular_damping
    }

    /// Set angular damping, clamped to `[0, 1]`
    pub fn set_angular_damping(&mut self, damping: f32) {
        self.angular_damping = damping.clamp(0.0, 1.0);
    }

    /// Linear velocity
    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    /// Set linear velocity
    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
        self.activate();
    }

    /// Angular velocity
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Set angular velocity
    pub fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
        self.activate();
    }

    /// Force accumulated since the last step
    pub fn total_force(&self) -> Vec3 {
        self.total_force
    }

    /// Torque accumulated since the last step
    pub fn total_torque(&self) -> Vec3 {
        self.total_torque
    }

    /// Apply a force at a point relative to the centre of mass
    pub fn apply_force(&mut self, force: Vec3, relative_position: Vec3) {
        self.total_force += force;
        self.total_torque += relative_position.cross(&force);
        self.activate();
    }

    /// Apply a force through the centre of mass
    pub fn apply_central_force(&mut self, force: Vec3) {
        self.total_force += force;
        self.activate();
    }

    /// Apply a torque
    pub fn apply_torque(&mut self, torque: Vec3) {
        self.total_torque += torque;
        self.activate();
    }

    /// Apply an impulse at a point relative to the centre of mass
    pub fn apply_impulse(&mut self, impulse: Vec3, relative_position: Vec3) {
        self.apply_central_impulse(impulse);
        self.apply_torque_impulse(relative_position.cross(&impulse));
    }

    /// Apply an impulse through the centre of mass
    pub fn apply_central_impulse(&mut self, impulse: Vec3) {
        if self.is_dynamic() {
            self.linear_velocity += impulse / self.mass;
        }
        self.activate();
    }

    /// Apply an angular impulse
    pub fn apply_torque_impulse(&mut self, torque: Vec3) {
        self.angular_velocity += self.inverse_inertia().component_mul(&torque);
        self.activate();
    }

    /// Whether the body is awake
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Wake the body
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Advance the body by one fixed step under `gravity`
    pub(crate) fn integrate(&mut self, step: f32, gravity: &Vec3) {
        if !self.is_dynamic() || !self.active {
            return;
        }

        let acceleration = gravity + self.total_force / self.mass;
        self.linear_velocity += acceleration * step;
        self.angular_velocity += self.inverse_inertia().component_mul(&self.total_torque) * step;

        self.linear_velocity *= (1.0 - self.linear_damping).powf(step);
        self.angular_velocity *= (1.0 - self.angular_damping).powf(step);

        self.position += self.linear_velocity * step;
        let spin = self.angular_velocity * step;
        if spin.norm_squared() > 0.0 {
            self.rotation = Quat::from_scaled_axis(spin) * self.rotation;
            self.rotation.renormalize();
        }
    }

    pub(crate) fn clear_forces(&mut self) {
        self.total_force = Vec3::zeros();
        self.total_torque = Vec3::zeros();
    }

    fn inverse_inertia(&self) -> Vec3 {
        self.inertia.map(|i| if i > 0.0 { 1.0 / i } else { 0.0 })
    }

    fn update_inertia(&mut self) {
        self.inertia = self.shape.local_inertia(self.mass);
    }
}

/// Shared handle to a rigid body
///
/// The owning component and the physics world both hold one. Equality is identity.
#[derive(Debug, Clone)]
pub struct RigidBodyHandle(Rc<RefCell<RigidBody>>);

impl RigidBodyHandle {
    /// Wrap a body into a new handle
    pub fn new(body: RigidBody) -> Self {
        Self(Rc::new(RefCell::new(body)))
    }

    /// Borrow the body immutably
    pub fn borrow(&self) -> Ref<'_, RigidBody> {
        self.0.borrow()
    }

    /// Borrow the body mutably
    pub fn borrow_mut(&self) -> RefMut<'_, RigidBody> {
        self.0.borrow_mut()
    }

    /// Whether both handles refer to the same body
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The shared cell itself, for handing out as a trait object
    pub fn shared(&self) -> Rc<RefCell<RigidBody>> {
        Rc::clone(&self.0)
    }
}

impl PartialEq for RigidBodyHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for RigidBodyHandle {}
