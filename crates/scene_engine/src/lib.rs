//! # Scene Engine
//!
//! An entity-component-scene runtime. Entities are bags of typed components
//! created by name through a [`ecs::ComponentRegistry`]; scenes keep a render
//! graph and a rigid-body world in step with the components their entities
//! carry; a [`game::Game`] loads scenes from a JSON description and drives the
//! running one frame by frame.
//!
//! ## Features
//!
//! - **Schema-driven components**: defaults, validation and flat JSON
//!   serialisation from one property schema per type
//! - **Lifecycle notifications**: siblings and the owning scene hear about
//!   every component addition and removal
//! - **Transform delegation**: a physics body can become the single source of
//!   truth for an entity's pose
//! - **Headless rendering**: any [`render::Renderer`] can draw a scene graph
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = ComponentRegistry::with_builtin_components(DelegationMode::Enabled)?;
//!     let mut game = Game::new(Rc::new(registry));
//!     game.load_file("game.json")?;
//!     game.start()?;
//!
//!     let mut renderer = HeadlessRenderer::new();
//!     for _ in 0..60 {
//!         game.tick(1.0 / 60.0);
//!         game.render(&mut renderer);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod game;
pub mod input;
pub mod physics;
pub mod render;
pub mod scene;

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, ConfigFormat},
        ecs::{
            components::{
                CameraComponent, FlyControllerComponent, FpsControllerComponent, LightComponent, MeshComponent,
                PhysicsComponent, TransformComponent,
            },
            Capabilities, Component, ComponentHandle, ComponentRegistry, DelegationError, DelegationMode, Entity,
            EntityData, EntityError, Options, PropertySchema, PropertyValue, RegisteredComponent, RegistryError,
            SpatialAuthority, Translation,
        },
        foundation::{
            math::{Mat4, Quat, Transform, Vec3},
            time::{FrameTimer, TimeSource},
        },
        game::{Game, GameConfig, GameData, GameError},
        input::{InputEvent, KeyCode},
        render::{HeadlessRenderer, NodeHandle, RenderSettings, Renderer, SceneGraph},
        scene::{Scene, SceneConfig, SceneData, SceneError},
    };
}
