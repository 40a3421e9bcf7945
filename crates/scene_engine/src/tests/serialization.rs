//! Option payloads and games surviving serialisation

use serde_json::{json, Value};

use super::{runtime_registry, EPSILON};
use crate::ecs::components::TransformComponent;
use crate::ecs::{ComponentRegistry, Translation};
use crate::foundation::math::{axis_angle, Vec3};
use crate::game::{Game, GameData};
use crate::scene::SceneData;
use approx::assert_relative_eq;

fn reserialize(registry: &ComponentRegistry, type_name: &str, raw: &Value) -> (Value, Value) {
    let first = registry.serialize(&registry.create(type_name, raw).unwrap()).unwrap();
    let second = registry.serialize(&registry.create(type_name, &first).unwrap()).unwrap();
    (first, second)
}

#[test]
fn test_components_survive_a_round_trip() {
    let registry = runtime_registry();
    let payloads = [
        ("mesh", json!({"shape": "sphere", "materialType": "basic", "materialColour": 0x12_3456, "castShadow": true})),
        ("camera", json!({"fov": 60, "near": 0.5, "far": 250})),
        ("light", json!({"type": "directional", "target": "sun", "intensity": 2.5, "castShadow": true, "shadowDarkness": 0.25})),
        ("physics", json!({"shape": "cylinder", "mass": 3, "friction": 0.25, "restitution": 0.5})),
        ("flycontroller", json!({})),
    ];
    for (type_name, raw) in payloads {
        let (first, second) = reserialize(&registry, type_name, &raw);
        assert_eq!(first, second, "{} changed on reload", type_name);
    }
}

#[test]
fn test_serialized_options_use_flat_shapes() {
    let registry = runtime_registry();
    let light = registry.serialize(&registry.create("light", &json!({})).unwrap()).unwrap();
    assert_eq!(light["colour"], json!(0xFF_FFFF));
    assert_eq!(light["type"], json!("point"));

    let transform = registry.serialize(&registry.create("transform", &json!({})).unwrap()).unwrap();
    assert_eq!(transform["position"], json!({"type": "vector", "parameters": [0.0, 0.0, 0.0]}));
    assert_eq!(transform["rotation"]["type"], json!("quaternion"));
}

#[test]
fn test_transform_round_trip_keeps_pose() {
    let registry = runtime_registry();
    let original = registry.create("transform", &json!({})).unwrap();
    {
        let transform = original.downcast_ref::<TransformComponent>().unwrap();
        transform.set_position(Vec3::new(1.5, -2.0, 8.0));
        transform.set_rotation(axis_angle(&Vec3::new(1.0, 1.0, 0.0), 0.75));
        transform.set_scale(Vec3::new(2.0, 3.0, 4.0));
    }
    let reloaded = registry.create("transform", &registry.serialize(&original).unwrap()).unwrap();

    let a = original.downcast_ref::<TransformComponent>().unwrap();
    let b = reloaded.downcast_ref::<TransformComponent>().unwrap();
    assert_relative_eq!(a.position(), b.position(), epsilon = EPSILON);
    assert_relative_eq!(a.scale(), b.scale(), epsilon = EPSILON);
    assert_relative_eq!(a.rotation().angle_to(&b.rotation()), 0.0, epsilon = 1e-3);
}

#[test]
fn test_raw_defaults_match_schema() {
    let registry = runtime_registry();
    for type_name in registry.list() {
        let schema = registry.properties(type_name).unwrap();
        let defaults = registry.defaults(type_name, &json!({}), Translation::Raw).unwrap();
        assert_eq!(defaults.len(), schema.len(), "{}", type_name);
        for (name, def) in schema.iter() {
            assert_eq!(defaults.get(name), Some(&def.default), "{}.{}", type_name, name);
        }
    }
}

#[test]
fn test_game_round_trip() {
    let registry = runtime_registry();
    let mut data = GameData::default();
    let mut scene = SceneData::with_default_camera();
    scene.entities.insert(
        "floor".to_string(),
        serde_json::from_value(json!({
            "transform": {"scale": {"type": "vector", "parameters": [50, 50, 1]}},
            "mesh": {"receiveShadow": true},
            "physics": {"mass": 0}
        }))
        .unwrap(),
    );
    data.scenes.insert("level".to_string(), scene);
    data.config.default_scene_id = "level".to_string();

    let mut game = Game::new(registry.clone());
    game.load(&data).unwrap();
    let saved = game.to_json().unwrap();

    let mut reloaded = Game::new(registry);
    reloaded.load(&saved).unwrap();
    let resaved = reloaded.to_json().unwrap();

    assert_eq!(reloaded.active_scene().unwrap().active_camera_id(), Some("default camera"));
    assert_eq!(saved.scenes["level"].entities["floor"], resaved.scenes["level"].entities["floor"]);
    assert_eq!(saved.config, resaved.config);
}
