//! Player settings

use std::path::PathBuf;

use scene_engine::config::Config;
use scene_engine::ecs::DelegationMode;
use serde::{Deserialize, Serialize};

/// How the player runs a game description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// JSON game description to load
    pub game_file: PathBuf,
    /// Number of frames to run
    pub frames: u32,
    /// Seconds per frame; wall clock time when unset
    pub fixed_delta: Option<f32>,
    /// Whether physics bodies take over transforms
    pub delegation: DelegationMode,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// Log a progress line every this many frames, 0 to disable
    pub report_interval: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            game_file: PathBuf::from("assets/demo_game.json"),
            frames: 300,
            fixed_delta: Some(1.0 / 60.0),
            delegation: DelegationMode::Enabled,
            viewport_width: 1280,
            viewport_height: 720,
            report_interval: 60,
        }
    }
}

impl Config for PlayerConfig {}
