//! Serialised scene description

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ecs::entity::EntityData;
use crate::physics::DEFAULT_GRAVITY;

/// Id of the camera entity added to new scenes
pub const DEFAULT_CAMERA_ENTITY_ID: &str = "default camera";

/// Scene `config` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    /// Entity whose camera is preferred on activation
    #[serde(rename = "defaultCameraEntityID", skip_serializing_if = "Option::is_none")]
    pub default_camera_entity_id: Option<String>,
    /// Z component of gravity
    pub gravity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self { default_camera_entity_id: None, gravity: DEFAULT_GRAVITY }
    }
}

/// One scene of a game description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneData {
    /// Scene settings
    pub config: SceneConfig,
    /// Entity id to components
    pub entities: BTreeMap<String, EntityData>,
}

impl SceneData {
    /// Template for a new scene: a single camera looking down at the origin
    pub fn with_default_camera() -> Self {
        let mut camera = EntityData::new();
        camera.insert(
            "transform".to_string(),
            json!({
                "position": {"type": "vector", "parameters": [0.0, -46.721_168_751_728_94, 62.853_930_566_438_855]},
                "rotation": {"type": "quaternion", "parameters": [0.384_808_188_808_245, 0.0, 0.0, 0.922_996_564_363_117_3]},
            }),
        );
        camera.insert("camera".to_string(), json!({}));

        let mut entities = BTreeMap::new();
        entities.insert(DEFAULT_CAMERA_ENTITY_ID.to_string(), camera);
        Self {
            config: SceneConfig { default_camera_entity_id: Some(DEFAULT_CAMERA_ENTITY_ID.to_string()), ..SceneConfig::default() },
            entities,
        }
    }
}
