//! Game runtime
//!
//! Loads scenes from a JSON game description through an explicitly passed
//! [`ComponentRegistry`], tracks which scene is running and drives it one
//! frame at a time: update, simulate, render.

mod config;
mod data;

pub use config::GameConfig;
pub use data::GameData;

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use crate::ecs::entity::{Entity, EntityData, EntityError};
use crate::ecs::registry::{ComponentRegistry, RegistryError};
use crate::input::InputEvent;
use crate::render::{RenderSettings, Renderer};
use crate::scene::{Scene, SceneData, SceneError};

/// Game errors
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// No scene with this id
    #[error("game has no scene '{0}'")]
    SceneNotFound(String),

    /// Scene ids must be unique
    #[error("game already has a scene '{0}'")]
    DuplicateScene(String),

    /// Scene-level failure
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Entity-level failure
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Registry-level failure
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Game description is not valid JSON
    #[error("invalid game description: {0}")]
    Json(#[from] serde_json::Error),

    /// Game description could not be read
    #[error("failed to read game description: {0}")]
    Io(#[from] std::io::Error),
}

/// Scenes, the running scene and game-wide settings
pub struct Game {
    registry: Rc<ComponentRegistry>,
    scenes: BTreeMap<String, Scene>,
    active_scene: Option<String>,
    config: GameConfig,
    aspect_ratio: f32,
}

impl Game {
    /// Empty game creating components through `registry`
    pub fn new(registry: Rc<ComponentRegistry>) -> Self {
        Self {
            registry,
            scenes: BTreeMap::new(),
            active_scene: None,
            config: GameConfig::default(),
            aspect_ratio: 1.0,
        }
    }

    /// Component registry
    pub fn registry(&self) -> &Rc<ComponentRegistry> {
        &self.registry
    }

    /// Replace every scene with those of `data` and activate one
    ///
    /// The first scene in id order is activated, then `defaultSceneID` if it
    /// names a loaded scene. On error the current scenes and config are kept.
    pub fn load(&mut self, data: &GameData) -> Result<(), GameError> {
        let mut scenes = BTreeMap::new();
        for (id, scene_data) in &data.scenes {
            scenes.insert(id.clone(), self.load_scene(scene_data)?);
        }
        self.clear();
        self.scenes = scenes;
        self.config = data.config.clone();
        log::info!("Loaded game with {} scenes", self.scenes.len());

        if let Some(first) = self.scenes.keys().next().cloned() {
            self.activate_scene(&first)?;
        }
        let default_id = self.config.default_scene_id.clone();
        if !default_id.is_empty() {
            if self.scenes.contains_key(&default_id) {
                self.activate_scene(&default_id)?;
            } else {
                log::warn!("Default scene '{}' does not exist", default_id);
            }
        }
        Ok(())
    }

    /// Parse and load a JSON game description
    pub fn load_json(&mut self, text: &str) -> Result<(), GameError> {
        let data = GameData::from_json(text)?;
        self.load(&data)
    }

    /// Read and load a JSON game description file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), GameError> {
        let path = path.as_ref();
        log::info!("Loading game from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        self.load_json(&text)
    }

    /// Build a scene and all its entities
    pub fn load_scene(&self, data: &SceneData) -> Result<Scene, GameError> {
        let mut scene = Scene::new(&data.config);
        for (id, entity_data) in &data.entities {
            let entity = self.load_entity(entity_data)?;
            scene.add(id, entity)?;
        }
        log::info!("Loaded scene with {} entities", scene.len());
        Ok(scene)
    }

    /// Build an entity, skipping components of unknown types
    pub fn load_entity(&self, data: &EntityData) -> Result<Entity, GameError> {
        let mut entity = Entity::new();
        for (type_name, raw) in data {
            match self.registry.create(type_name, raw) {
                Ok(component) => entity.add(component)?,
                Err(RegistryError::UnknownComponentType(name)) => {
                    log::warn!("Skipping component of unknown type '{}'", name);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(entity)
    }

    /// Make `scene_id` the running scene
    pub fn activate_scene(&mut self, scene_id: &str) -> Result<(), GameError> {
        if !self.scenes.contains_key(scene_id) {
            return Err(GameError::SceneNotFound(scene_id.to_string()));
        }
        if let Some(previous) = self.active_scene.take() {
            if let Some(scene) = self.scenes.get_mut(&previous) {
                scene.deactivate();
            }
        }
        let aspect = self.aspect_ratio;
        let scene = self
            .scenes
            .get_mut(scene_id)
            .ok_or_else(|| GameError::SceneNotFound(scene_id.to_string()))?;
        scene.activate();
        scene.set_aspect_ratio(aspect);
        self.active_scene = Some(scene_id.to_string());
        log::info!("Activated scene '{}'", scene_id);
        Ok(())
    }

    /// Make sure a scene is running
    ///
    /// Returns `false` when there is no scene to run.
    pub fn start(&mut self) -> Result<bool, GameError> {
        if self.active_scene.is_none() {
            let Some(first) = self.scenes.keys().next().cloned() else {
                log::warn!("Game has no scenes to start");
                return Ok(false);
            };
            self.activate_scene(&first)?;
        }
        Ok(true)
    }

    /// Advance the running scene by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if let Some(scene) = self.active_scene_mut() {
            scene.update(dt);
        }
    }

    /// Draw the running scene with `renderer`
    ///
    /// Returns `false` when there is no scene or camera to draw.
    pub fn render(&self, renderer: &mut dyn Renderer) -> bool {
        let settings = self.render_settings();
        self.active_scene().is_some_and(|scene| scene.render(renderer, &settings))
    }

    /// Resize the viewport and update the running camera's aspect ratio
    #[allow(clippy::cast_precision_loss)]
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("Ignoring empty viewport {}x{}", width, height);
            return;
        }
        self.aspect_ratio = width as f32 / height as f32;
        let aspect = self.aspect_ratio;
        if let Some(scene) = self.active_scene() {
            scene.set_aspect_ratio(aspect);
        }
    }

    /// Width over height of the viewport
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Forward an input event to the running scene
    ///
    /// With pointer lock, controllers see relative motion only; without it,
    /// cursor positions only.
    pub fn handle_input(&self, event: &InputEvent) {
        let wanted = match event {
            InputEvent::MouseMotion { .. } => self.config.pointer_lock_enabled,
            InputEvent::CursorPosition { .. } => !self.config.pointer_lock_enabled,
            InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. } => true,
        };
        if !wanted {
            return;
        }
        if let Some(scene) = self.active_scene() {
            scene.handle_input(event);
        }
    }

    /// Serialise every scene and the game config
    pub fn to_json(&self) -> Result<GameData, GameError> {
        let scenes = self
            .scenes
            .iter()
            .map(|(id, scene)| Ok((id.clone(), scene.to_json(&self.registry)?)))
            .collect::<Result<_, RegistryError>>()?;
        Ok(GameData { scenes, config: self.config.clone() })
    }

    /// Add a scene under `scene_id`
    pub fn add_scene(&mut self, scene_id: &str, scene: Scene) -> Result<(), GameError> {
        if self.scenes.contains_key(scene_id) {
            return Err(GameError::DuplicateScene(scene_id.to_string()));
        }
        self.scenes.insert(scene_id.to_string(), scene);
        Ok(())
    }

    /// Remove and return the scene `scene_id`
    pub fn remove_scene(&mut self, scene_id: &str) -> Result<Scene, GameError> {
        let mut scene = self
            .scenes
            .remove(scene_id)
            .ok_or_else(|| GameError::SceneNotFound(scene_id.to_string()))?;
        if self.active_scene.as_deref() == Some(scene_id) {
            scene.deactivate();
            self.active_scene = None;
        }
        Ok(scene)
    }

    /// Drop every scene
    pub fn clear(&mut self) {
        self.scenes.clear();
        self.active_scene = None;
    }

    /// Scene `scene_id`
    pub fn scene(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes.get(scene_id)
    }

    /// Mutable scene `scene_id`
    pub fn scene_mut(&mut self, scene_id: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(scene_id)
    }

    /// Scenes by id
    pub fn scenes(&self) -> impl Iterator<Item = (&str, &Scene)> {
        self.scenes.iter().map(|(id, scene)| (id.as_str(), scene))
    }

    /// Id of the running scene
    pub fn active_scene_id(&self) -> Option<&str> {
        self.active_scene.as_deref()
    }

    /// Running scene
    pub fn active_scene(&self) -> Option<&Scene> {
        self.scenes.get(self.active_scene.as_deref()?)
    }

    /// Mutable running scene
    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        let id = self.active_scene.as_deref()?;
        self.scenes.get_mut(id)
    }

    /// Game-wide settings
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Replace the game-wide settings
    pub fn set_config(&mut self, config: GameConfig) {
        self.config = config;
    }

    /// Renderer state from the game config
    pub fn render_settings(&self) -> RenderSettings {
        self.config.render_settings()
    }
}
