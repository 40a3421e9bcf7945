//! Physics world
//!
//! Fixed-step integration of the bodies of one scene. Contacts are not resolved.

use super::rigid_body::RigidBodyHandle;
use crate::foundation::math::Vec3;

/// Default world gravity, Z-up
pub const DEFAULT_GRAVITY: f32 = -9.86;

/// Length of one simulation step in seconds
pub const FIXED_TIME_STEP: f32 = 1.0 / 60.0;

/// Upper bound on sub-steps per call used by scenes
pub const MAX_SUB_STEPS: u32 = 20;

/// Collection of simulated rigid bodies
#[derive(Debug)]
pub struct PhysicsWorld {
    bodies: Vec<RigidBodyHandle>,
    gravity: Vec3,
    fixed_time_step: f32,
    accumulator: f32,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, DEFAULT_GRAVITY))
    }
}

impl PhysicsWorld {
    /// Create an empty world with the given gravity
    pub fn new(gravity: Vec3) -> Self {
        Self {
            bodies: Vec::new(),
            gravity,
            fixed_time_step: FIXED_TIME_STEP,
            accumulator: 0.0,
        }
    }

    /// Add a body. Returns `false` if it was already in the world.
    pub fn add_rigid_body(&mut self, body: RigidBodyHandle) -> bool {
        if self.contains(&body) {
            return false;
        }
        self.bodies.push(body);
        true
    }

    /// Remove a body. Returns `false` if it was not in the world.
    pub fn remove_rigid_body(&mut self, body: &RigidBodyHandle) -> bool {
        let before = self.bodies.len();
        self.bodies.retain(|b| !b.ptr_eq(body));
        self.bodies.len() != before
    }

    /// Whether the body is in the world
    pub fn contains(&self, body: &RigidBodyHandle) -> bool {
        self.bodies.iter().any(|b| b.ptr_eq(body))
    }

    /// Number of bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Global gravity
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Set global gravity
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Advance the simulation by `dt` seconds in fixed steps
    ///
    /// Leftover time carries over to the next call. At most `max_sub_steps`
    /// steps run; time beyond that is dropped. Returns the number of steps run.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn step_simulation(&mut self, dt: f32, max_sub_steps: u32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 || max_sub_steps == 0 {
            return 0;
        }

        self.accumulator += dt;
        let available = (self.accumulator / self.fixed_time_step).floor() as u32;
        self.accumulator -= available as f32 * self.fixed_time_step;
        let steps = available.min(max_sub_steps);

        for _ in 0..steps {
            for body in &self.bodies {
                body.borrow_mut().integrate(self.fixed_time_step, &self.gravity);
            }
        }
        if steps > 0 {
            for body in &self.bodies {
                body.borrow_mut().clear_forces();
            }
        }

        log::trace!("Physics stepped {} x {}s ({} bodies)", steps, self.fixed_time_step, self.bodies.len());
        steps
    }
}
