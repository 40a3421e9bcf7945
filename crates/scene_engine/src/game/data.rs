//! Serialised game description

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::GameConfig;
use crate::scene::SceneData;

/// A whole game: scenes by id plus game-wide settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameData {
    /// Scene id to scene
    pub scenes: BTreeMap<String, SceneData>,
    /// Game-wide settings
    pub config: GameConfig,
}

impl GameData {
    /// Parse a JSON game description
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Pretty-printed JSON game description
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
