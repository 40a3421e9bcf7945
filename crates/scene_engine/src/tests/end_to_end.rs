//! Whole-runtime scenarios: loading, ticking, rendering and delegation modes

use serde_json::json;

use super::{runtime_registry, EPSILON};
use crate::ecs::components::{LightComponent, PhysicsComponent, TransformComponent};
use crate::ecs::{ComponentRegistry, DelegationMode, Entity};
use crate::foundation::math::Vec3;
use crate::game::Game;
use crate::scene::Scene;
use approx::assert_relative_eq;

#[test]
fn test_transform_created_from_empty_options_sits_at_origin() {
    let mut registry = ComponentRegistry::new(DelegationMode::Enabled);
    registry.register_component::<TransformComponent>().unwrap();

    let handle = registry.create("transform", &json!({})).unwrap();
    let transform = handle.downcast_ref::<TransformComponent>().unwrap();
    assert_relative_eq!(transform.position(), Vec3::zeros(), epsilon = EPSILON);
}

#[test]
fn test_loaded_game_activates_default_scene() {
    let mut game = Game::new(runtime_registry());
    game.load_json(r#"{"scenes": {"a": {"entities": {"e1": {"transform": {}}}}}, "config": {"defaultSceneID": "a"}}"#)
        .unwrap();

    assert_eq!(game.scenes().count(), 1);
    assert_eq!(game.active_scene_id(), Some("a"));
    let scene = game.active_scene().unwrap();
    let transform = scene.entity("e1").unwrap().component::<TransformComponent>().unwrap();
    assert_relative_eq!(transform.position(), Vec3::zeros(), epsilon = EPSILON);
    assert_relative_eq!(transform.scale(), Vec3::new(1.0, 1.0, 1.0), epsilon = EPSILON);
    assert_relative_eq!(transform.rotation().angle(), 0.0, epsilon = EPSILON);
}

fn entity_with_physics(delegation: DelegationMode) -> Entity {
    let registry = ComponentRegistry::with_builtin_components(delegation).unwrap();
    let mut entity = Entity::new();
    entity.add(registry.create("transform", &json!({})).unwrap()).unwrap();
    entity.add(registry.create("physics", &json!({"mass": 2})).unwrap()).unwrap();
    entity
}

#[test]
fn test_physics_takes_over_transform_at_runtime() {
    let entity = entity_with_physics(DelegationMode::Enabled);
    let transform = entity.component::<TransformComponent>().unwrap();
    assert!(transform.is_delegating());
    assert_eq!(transform.subscriber(), Some("physics"));
}

#[test]
fn test_physics_leaves_transform_alone_in_editor() {
    let entity = entity_with_physics(DelegationMode::Disabled);
    let transform = entity.component::<TransformComponent>().unwrap();
    assert!(!transform.is_delegating());

    let physics = entity.component::<PhysicsComponent>().unwrap();
    physics.body().borrow_mut().set_position(Vec3::new(5.0, 0.0, 0.0));
    assert_relative_eq!(transform.position(), Vec3::zeros(), epsilon = EPSILON);
}

#[test]
fn test_light_joins_and_leaves_render_graph_with_entity() {
    let registry = runtime_registry();
    let mut scene = Scene::default();
    let mut entity = Entity::new();
    entity.add(registry.create("transform", &json!({})).unwrap()).unwrap();
    scene.add("lamp", entity).unwrap();
    scene.activate();

    let light = registry.create("light", &json!({"type": "spotlight"})).unwrap();
    scene.entity_mut("lamp").unwrap().add(light.clone()).unwrap();
    let node = light.downcast_ref::<LightComponent>().unwrap().node().clone();
    assert!(scene.bridge().borrow().graph().contains(&node));

    let entity = scene.remove("lamp").unwrap();
    assert!(!scene.bridge().borrow().graph().contains(&node));
    assert!(!entity.is_in_scene());
}
