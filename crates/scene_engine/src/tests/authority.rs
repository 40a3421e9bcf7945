//! Transforms handing their pose to a spatial authority and taking it back

use serde_json::json;

use super::{runtime_registry, EPSILON};
use crate::ecs::components::{PhysicsComponent, TransformComponent};
use crate::ecs::{ComponentHandle, Entity, FactoryContext};
use crate::foundation::math::{axis_angle, Vec3};
use crate::physics::ShapeKind;
use crate::scene::Scene;
use approx::assert_relative_eq;

#[test]
fn test_existing_pose_is_handed_to_body() {
    let registry = runtime_registry();
    let mut entity = Entity::new();
    entity
        .add(registry.create("transform", &json!({"position": {"type": "vector", "parameters": [1, 2, 3]}})).unwrap())
        .unwrap();
    entity.add(registry.create("physics", &json!({})).unwrap()).unwrap();

    let physics = entity.component::<PhysicsComponent>().unwrap();
    assert_relative_eq!(physics.body().borrow().position(), Vec3::new(1.0, 2.0, 3.0), epsilon = EPSILON);
}

#[test]
fn test_transform_reads_through_to_body() {
    let registry = runtime_registry();
    let mut entity = Entity::new();
    entity.add(registry.create("physics", &json!({})).unwrap()).unwrap();
    entity.add(registry.create("transform", &json!({})).unwrap()).unwrap();

    let physics = entity.component::<PhysicsComponent>().unwrap();
    let transform = entity.component::<TransformComponent>().unwrap();
    let spin = axis_angle(&Vec3::z(), 0.5);
    physics.body().borrow_mut().set_position(Vec3::new(0.0, 4.0, 0.0));
    physics.body().borrow_mut().set_rotation(spin);

    assert_relative_eq!(transform.position(), Vec3::new(0.0, 4.0, 0.0), epsilon = EPSILON);
    assert_relative_eq!(transform.rotation().angle(), 0.5, epsilon = EPSILON);
    assert_relative_eq!(transform.scale(), physics.body().borrow().scale(), epsilon = EPSILON);

    transform.set_scale(Vec3::new(2.0, 2.0, 2.0));
    assert_relative_eq!(physics.body().borrow().scale(), Vec3::new(2.0, 2.0, 2.0), epsilon = EPSILON);
    assert_relative_eq!(transform.node().borrow().scale, Vec3::new(2.0, 2.0, 2.0), epsilon = EPSILON);
}

#[test]
fn test_simulation_moves_transform_and_node() {
    let registry = runtime_registry();
    let mut entity = Entity::new();
    entity.add(registry.create("transform", &json!({})).unwrap()).unwrap();
    entity.add(registry.create("physics", &json!({"mass": 1})).unwrap()).unwrap();
    let mut scene = Scene::default();
    scene.add("ball", entity).unwrap();

    for _ in 0..30 {
        scene.update(1.0 / 60.0);
    }

    let entity = scene.entity("ball").unwrap();
    let transform = entity.component::<TransformComponent>().unwrap();
    let body_position = entity.component::<PhysicsComponent>().unwrap().body().borrow().position();
    assert!(transform.position().z < 0.0);
    assert_relative_eq!(transform.position(), body_position, epsilon = EPSILON);
    assert_relative_eq!(transform.node().borrow().position, body_position, epsilon = EPSILON);
}

#[test]
fn test_last_subscriber_wins_and_removal_releases() {
    let context = FactoryContext::default();
    let mut entity = Entity::new();
    entity.add(ComponentHandle::new("transform", TransformComponent::new(&context))).unwrap();
    entity.add(ComponentHandle::new("physics", PhysicsComponent::new(ShapeKind::Box, 1.0))).unwrap();

    let other = PhysicsComponent::new(ShapeKind::Sphere, 1.0);
    other.body().borrow_mut().set_position(Vec3::new(9.0, 9.0, 9.0));
    let other = ComponentHandle::new("ragdoll", other);
    entity.component_mut::<TransformComponent>().unwrap().subscribe(&other).unwrap();

    {
        let transform = entity.component::<TransformComponent>().unwrap();
        assert_eq!(transform.subscriber(), Some("ragdoll"));
        // The transform's pose was pushed into the new authority
        assert_relative_eq!(transform.position(), Vec3::zeros(), epsilon = EPSILON);
    }

    entity.add(other).unwrap();
    entity.remove("ragdoll").unwrap();
    let transform = entity.component::<TransformComponent>().unwrap();
    assert!(!transform.is_delegating());
}
