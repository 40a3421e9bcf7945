//! Physics module
//!
//! Rigid bodies with primitive collision shapes, simulated by a fixed-step
//! [`PhysicsWorld`]. Each scene owns one world; physics components hand
//! their bodies to it through the scene.

pub mod shape;
pub mod rigid_body;
pub mod world;

pub use shape::{CollisionShape, ShapeKind, UNIT_HALF_EXTENT};
pub use rigid_body::{RigidBody, RigidBodyHandle};
pub use world::{PhysicsWorld, DEFAULT_GRAVITY, FIXED_TIME_STEP, MAX_SUB_STEPS};
