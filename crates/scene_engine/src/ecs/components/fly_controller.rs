//! Free-flight controller
//!
//! Mouse motion turns the entity, WASD moves it along the view direction and
//! Space/Shift move it straight up and down. Moves one unit per frame per axis.

use std::any::Any;

use super::controls::{MouseLook, MoveAxes};
use crate::ecs::component::{Capabilities, Component};
use crate::ecs::components::TransformComponent;
use crate::ecs::entity::Entity;
use crate::ecs::registry::{FactoryContext, RegisteredComponent};
use crate::ecs::schema::{Options, PropertySchema};
use crate::foundation::math::{constants, Vec3};
use crate::input::InputEvent;

const SENSITIVITY: f32 = -0.005;

/// Mouse and keyboard free-flight camera control
pub struct FlyControllerComponent {
    look: MouseLook,
    axes: MoveAxes,
}

impl FlyControllerComponent {
    /// Controller looking along +Y
    pub fn new() -> Self {
        Self { look: MouseLook::new(SENSITIVITY), axes: MoveAxes::default() }
    }
}

impl Default for FlyControllerComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for FlyControllerComponent {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::INPUT | Capabilities::DRIVES_POSE
    }

    fn update(&mut self, dt: f32, entity: &Entity) {
        if dt.abs() < f32::EPSILON {
            return;
        }
        let Some(transform) = entity.component::<TransformComponent>() else {
            return;
        };
        let look = self.look.look();
        transform.set_rotation(look);

        let forward = look * Vec3::new(0.0, 0.0, -1.0);
        let right = look * Vec3::x();
        let up = Vec3::from(constants::UP);
        let step = forward * self.axes.forward + right * self.axes.right + up * self.axes.up;
        if step != Vec3::zeros() {
            transform.set_position(transform.position() + step);
        }
    }

    fn handle_input(&mut self, event: &InputEvent) {
        self.look.handle(event);
        self.axes.handle(event, true);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl RegisteredComponent for FlyControllerComponent {
    const TYPE_NAME: &'static str = "flycontroller";

    fn schema() -> PropertySchema {
        PropertySchema::new()
    }

    fn from_options(_options: &Options, _context: &FactoryContext) -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::ComponentHandle;
    use crate::ecs::components::CameraComponent;
    use crate::input::KeyCode;
    use approx::assert_relative_eq;

    fn flying_entity() -> Entity {
        let mut entity = Entity::new();
        let context = FactoryContext::default();
        entity.add(ComponentHandle::new("transform", TransformComponent::new(&context))).unwrap();
        entity.add(ComponentHandle::new("flycontroller", FlyControllerComponent::new())).unwrap();
        entity
    }

    #[test]
    fn test_forward_key_moves_along_view() {
        let entity = flying_entity();
        let controller = entity.get("flycontroller").unwrap();
        controller.borrow_mut().handle_input(&InputEvent::KeyDown { key: KeyCode::W, repeat: false });

        entity.update(0.016);
        entity.update(0.016);

        let transform = entity.component::<TransformComponent>().unwrap();
        assert_relative_eq!(transform.position(), Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_camera_follows_within_the_same_frame() {
        let mut entity = flying_entity();
        entity.add(ComponentHandle::new("camera", CameraComponent::new(75.0, 0.1, 1000.0))).unwrap();
        entity.get("flycontroller").unwrap().borrow_mut().handle_input(&InputEvent::KeyDown { key: KeyCode::W, repeat: false });

        entity.update(0.016);

        let camera = entity.component::<CameraComponent>().unwrap();
        assert_relative_eq!(camera.node().borrow().position, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_zero_dt_is_ignored() {
        let entity = flying_entity();
        entity.get("flycontroller").unwrap().borrow_mut().handle_input(&InputEvent::KeyDown { key: KeyCode::Space, repeat: false });
        entity.update(0.0);
        let transform = entity.component::<TransformComponent>().unwrap();
        assert_relative_eq!(transform.position(), Vec3::zeros());
    }
}
