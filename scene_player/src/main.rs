//! Scene player
//!
//! Loads a JSON game description and runs it headless for a fixed number of
//! frames, logging what the renderer would have drawn.
//!
//! Usage: `scene_player [config.toml|config.ron|config.json]`

mod config;

use std::rc::Rc;

use scene_engine::config::{Config, ConfigError};
use scene_engine::foundation::logging;
use scene_engine::foundation::time::{FrameTimer, TimeSource};
use scene_engine::game::{Game, GameError};
use scene_engine::prelude::{ComponentRegistry, RegistryError, TransformComponent};
use scene_engine::render::HeadlessRenderer;

use config::PlayerConfig;

const DEFAULT_CONFIG_PATH: &str = "assets/player.toml";

/// Player errors
#[derive(thiserror::Error, Debug)]
enum PlayerError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("component registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("game: {0}")]
    Game(#[from] GameError),

    #[error("game has no scene to run")]
    NoScene,
}

fn run(config: &PlayerConfig) -> Result<(), PlayerError> {
    let registry = ComponentRegistry::with_builtin_components(config.delegation)?;
    log::debug!("Component types: {}", registry.list().join(", "));

    let mut game = Game::new(Rc::new(registry));
    game.set_viewport(config.viewport_width, config.viewport_height);
    game.load_file(&config.game_file)?;
    if !game.start()? {
        return Err(PlayerError::NoScene);
    }

    let source = config.fixed_delta.map_or(TimeSource::RealTime, TimeSource::Fixed);
    let mut timer = FrameTimer::new(source);
    let mut renderer = HeadlessRenderer::new();

    for frame in 1..=config.frames {
        let dt = timer.tick();
        game.tick(dt);
        if !game.render(&mut renderer) {
            log::warn!("Frame {}: active scene has no camera", frame);
        }
        if config.report_interval > 0 && frame % config.report_interval == 0 {
            let stats = renderer.last_frame();
            log::info!(
                "Frame {}: {} meshes, {} lights, camera at ({:.2}, {:.2}, {:.2})",
                frame,
                stats.meshes,
                stats.lights,
                stats.camera_position.x,
                stats.camera_position.y,
                stats.camera_position.z
            );
        }
    }

    log::info!(
        "Ran {} frames over {:.2}s of game time ({} rendered)",
        timer.frame_count(),
        timer.total_time(),
        renderer.frames()
    );
    if let Some(scene) = game.active_scene() {
        for (id, entity) in scene.entities() {
            if let Some(transform) = entity.component::<TransformComponent>() {
                let p = transform.position();
                log::info!("  {}: ({:.2}, {:.2}, {:.2})", id, p.x, p.y, p.z);
            }
        }
    }
    Ok(())
}

fn main() {
    logging::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = match PlayerConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Failed to load {}: {}", config_path, err);
            std::process::exit(1);
        }
    };

    log::info!("Starting scene player with {}", config.game_file.display());
    if let Err(err) = run(&config) {
        log::error!("Scene player failed: {}", err);
        std::process::exit(1);
    }
}
