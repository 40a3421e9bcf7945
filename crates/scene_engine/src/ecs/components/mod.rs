//! Built-in component types

mod controls;

pub mod camera;
pub mod fly_controller;
pub mod fps_controller;
pub mod light;
pub mod mesh;
pub mod physics;
pub mod transform;

pub use camera::CameraComponent;
pub use fly_controller::FlyControllerComponent;
pub use fps_controller::FpsControllerComponent;
pub use light::LightComponent;
pub use mesh::MeshComponent;
pub use physics::PhysicsComponent;
pub use transform::TransformComponent;

use super::registry::{ComponentRegistry, RegistryError};

/// Register every built-in component type with `registry`
pub fn register_builtin_components(registry: &mut ComponentRegistry) -> Result<(), RegistryError> {
    registry.register_component::<TransformComponent>()?;
    registry.register_component::<MeshComponent>()?;
    registry.register_component::<CameraComponent>()?;
    registry.register_component::<LightComponent>()?;
    registry.register_component::<PhysicsComponent>()?;
    registry.register_component::<FlyControllerComponent>()?;
    registry.register_component::<FpsControllerComponent>()?;
    log::debug!("Registered {} built-in component types", registry.list().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::authority::DelegationMode;

    #[test]
    fn test_builtin_types_are_listed_sorted() {
        let registry = ComponentRegistry::with_builtin_components(DelegationMode::Enabled).unwrap();
        assert_eq!(
            registry.list(),
            vec!["camera", "flycontroller", "fpscontroller", "light", "mesh", "physics", "transform"]
        );
    }
}
