//! Game `config` block

use serde::{Deserialize, Serialize};

use crate::render::{RenderSettings, ShadowMapType};

/// Game-wide settings read from the game description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    /// Render shadow maps
    pub shadow_map_enabled: bool,
    /// Shadow map filtering
    pub shadow_map_type: ShadowMapType,
    /// Packed `0xRRGGBB` clear colour
    pub clear_colour: u32,
    /// Controllers read relative mouse motion instead of cursor positions
    pub pointer_lock_enabled: bool,
    /// Scene activated after loading
    #[serde(rename = "defaultSceneID")]
    pub default_scene_id: String,
    /// Near plane of shadow cameras
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_camera_near: Option<f32>,
    /// Far plane of shadow cameras
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_camera_far: Option<f32>,
    /// Field of view of shadow cameras in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_camera_fov: Option<f32>,
    /// Depth bias of shadow lookups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_map_bias: Option<f32>,
    /// Global shadow darkness
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_map_darkness: Option<f32>,
    /// Shadow map width in texels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_map_width: Option<u32>,
    /// Shadow map height in texels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_map_height: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            shadow_map_enabled: true,
            shadow_map_type: ShadowMapType::default(),
            clear_colour: 0,
            pointer_lock_enabled: false,
            default_scene_id: String::new(),
            shadow_camera_near: None,
            shadow_camera_far: None,
            shadow_camera_fov: None,
            shadow_map_bias: None,
            shadow_map_darkness: None,
            shadow_map_width: None,
            shadow_map_height: None,
        }
    }
}

impl GameConfig {
    /// Renderer state described by this config
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            clear_colour: self.clear_colour,
            shadow_map_enabled: self.shadow_map_enabled,
            shadow_map_type: self.shadow_map_type,
        }
    }
}
